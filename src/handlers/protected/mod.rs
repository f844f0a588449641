// handlers/protected - bearer JWT required; every operation is scoped to the caller
pub mod tareas;
