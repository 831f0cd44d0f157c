pub mod aggregate;
pub mod sankey;
