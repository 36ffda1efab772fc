//! Placeholder templates for FIDGA.
//!
//! Templates use a single construct, `{{ key }}`, filled from product or JSON
//! data. There are no expressions, filters or control flow.

mod creative;
mod render;

pub use creative::{Creative, CreativeTemplates, Product, demo_products, generate_variations};
pub use render::{TemplateData, render};
