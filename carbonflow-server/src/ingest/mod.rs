pub mod normalize;
pub mod tabular;
pub mod validate;
