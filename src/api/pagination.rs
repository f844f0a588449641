use serde::{Deserialize, Serialize};

use crate::filter::{Page, TaskFilter};

/// Page envelope: `{count, next, previous, results}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Build links relative to `base_path`, preserving the active filters
    pub fn new(results: Vec<T>, count: i64, page: &Page, filter: &TaskFilter, base_path: &str) -> Self {
        let next = page
            .has_next()
            .then(|| page_link(base_path, filter, Some(page.number + 1)));

        // Like the first page link everywhere else, page 1 carries no page parameter
        let previous = page.has_previous().then(|| {
            let target = page.number - 1;
            page_link(base_path, filter, (target > 1).then_some(target))
        });

        Self { count, next, previous, results }
    }
}

fn page_link(base_path: &str, filter: &TaskFilter, page: Option<i64>) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    if let Some(completed) = filter.completed {
        query.append_pair("completado", if completed { "true" } else { "false" });
    }
    if let Some(title) = &filter.title {
        query.append_pair("titulo", title);
    }
    if let Some(page) = page {
        query.append_pair("page", &page.to_string());
    }

    let query = query.finish();
    if query.is_empty() {
        base_path.to_string()
    } else {
        format!("{}?{}", base_path, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::PageRequest;

    fn page(n: u32, count: i64) -> Page {
        PageRequest::Number(n).resolve(count, 10).unwrap()
    }

    #[test]
    fn single_page_has_no_links() {
        let p: Paginated<i32> = Paginated::new(vec![1, 2], 2, &page(1, 2), &TaskFilter::default(), "/tareas/");
        assert_eq!(p.next, None);
        assert_eq!(p.previous, None);
    }

    #[test]
    fn middle_page_links_both_ways() {
        let p: Paginated<i32> = Paginated::new(vec![], 35, &page(3, 35), &TaskFilter::default(), "/tareas/");
        assert_eq!(p.next.as_deref(), Some("/tareas/?page=4"));
        assert_eq!(p.previous.as_deref(), Some("/tareas/?page=2"));
    }

    #[test]
    fn previous_to_first_page_drops_page_param() {
        let p: Paginated<i32> = Paginated::new(vec![], 15, &page(2, 15), &TaskFilter::default(), "/tareas/");
        assert_eq!(p.previous.as_deref(), Some("/tareas/"));
        assert_eq!(p.next, None);
    }

    #[test]
    fn links_keep_filters_encoded() {
        let filter = TaskFilter { completed: Some(false), title: Some("Buy milk & eggs".to_string()) };
        let p: Paginated<i32> = Paginated::new(vec![], 25, &page(1, 25), &filter, "/tareas/");
        assert_eq!(
            p.next.as_deref(),
            Some("/tareas/?completado=false&titulo=Buy+milk+%26+eggs&page=2")
        );
    }
}
