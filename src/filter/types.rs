use serde::Deserialize;

use super::error::FilterError;

/// Raw list query string: `?completado=true&titulo=...&page=2`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub completado: Option<String>,
    pub titulo: Option<String>,
    pub page: Option<String>,
}

impl ListQuery {
    pub fn filter(&self) -> Result<TaskFilter, FilterError> {
        let completed = match self.completado.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_bool(raw).ok_or_else(|| FilterError::InvalidBoolean {
                field: "completado",
                value: raw.to_string(),
            })?),
        };

        let title = self
            .titulo
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        Ok(TaskFilter { completed, title })
    }

    pub fn page(&self) -> Result<PageRequest, FilterError> {
        PageRequest::parse(self.page.as_deref())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "true" | "True" | "1" => Some(true),
        "false" | "False" | "0" => Some(false),
        _ => None,
    }
}

/// Optional narrowing applied on top of the owner scope
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub completed: Option<bool>,
    /// Exact title match
    pub title: Option<String>,
}

impl TaskFilter {
    pub fn is_empty(&self) -> bool {
        self.completed.is_none() && self.title.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    Number(u32),
    Last,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::Number(1)
    }
}

impl PageRequest {
    pub fn parse(raw: Option<&str>) -> Result<Self, FilterError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(PageRequest::Number(1)),
            Some("last") => Ok(PageRequest::Last),
            Some(s) => match s.parse::<u32>() {
                Ok(n) if n >= 1 => Ok(PageRequest::Number(n)),
                _ => Err(FilterError::InvalidPage(s.to_string())),
            },
        }
    }

    /// Resolve against the filtered row count. An empty result set still has page 1.
    pub fn resolve(self, count: i64, page_size: u32) -> Result<Page, FilterError> {
        let size = i64::from(page_size.max(1));
        let total_pages = ((count + size - 1) / size).max(1);

        let number = match self {
            PageRequest::Last => total_pages,
            PageRequest::Number(n) => i64::from(n),
        };
        if number > total_pages {
            return Err(FilterError::InvalidPage(number.to_string()));
        }

        Ok(Page {
            number,
            total_pages,
            limit: size,
            offset: (number - 1) * size,
        })
    }
}

/// A resolved page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: i64,
    pub total_pages: i64,
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }
}
