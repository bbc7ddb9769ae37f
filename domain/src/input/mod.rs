//! Input line state (normal typing, `/` command menu, web search).

pub mod mode;
