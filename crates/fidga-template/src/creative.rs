//! Dynamic creative optimization: product data × creative templates.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::render::{TemplateData, render};

/// A product whose attributes fill template placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
  pub id: String,
  #[serde(flatten)]
  pub attributes: BTreeMap<String, String>,
}

impl Product {
  pub fn new<I, K, V>(id: impl Into<String>, attributes: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
  {
    Self {
      id: id.into(),
      attributes: attributes
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect(),
    }
  }

  pub fn name(&self) -> &str {
    self.attributes.get("name").map_or(self.id.as_str(), String::as_str)
  }
}

impl TemplateData for Product {
  fn lookup(&self, key: &str) -> Option<Cow<'_, str>> {
    if key == "id" {
      return Some(Cow::Borrowed(self.id.as_str()));
    }
    self.attributes.lookup(key)
  }
}

/// Headline, description and call-to-action template lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreativeTemplates {
  pub headline: Vec<String>,
  pub description: Vec<String>,
  pub cta: Vec<String>,
}

impl Default for CreativeTemplates {
  fn default() -> Self {
    Self {
      headline: vec![
        "Buy {{name}} for just {{price}}!".to_string(),
        "New: {{feature}} {{name}}".to_string(),
      ],
      description: vec![
        "Get your {{color}} {{name}} today.".to_string(),
        "Perfect for all ages. Only {{price}}.".to_string(),
      ],
      cta: vec!["Shop Now".to_string(), "Learn More".to_string()],
    }
  }
}

/// Sample catalog used when no products are supplied.
pub fn demo_products() -> Vec<Product> {
  vec![
    Product::new(
      "1",
      [
        ("name", "Eco Floped"),
        ("price", "₹499"),
        ("color", "Green"),
        ("feature", "Sustainable"),
      ],
    ),
    Product::new(
      "2",
      [
        ("name", "Kids Chappal"),
        ("price", "₹299"),
        ("color", "Blue"),
        ("feature", "Waterproof"),
      ],
    ),
    Product::new(
      "3",
      [
        ("name", "Classic Doohickey"),
        ("price", "₹399"),
        ("color", "Black"),
        ("feature", "Comfort"),
      ],
    ),
  ]
}

/// One rendered ad variation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creative {
  pub product_id: String,
  pub headline: String,
  pub description: String,
  pub cta: String,
}

/// Render every headline × description × cta combination for each product.
///
/// Output is grouped by product, then ordered by headline, description and
/// cta index. An empty template list yields no variations.
pub fn generate_variations(products: &[Product], templates: &CreativeTemplates) -> Vec<Creative> {
  let mut creatives = Vec::with_capacity(
    products.len() * templates.headline.len() * templates.description.len() * templates.cta.len(),
  );

  for product in products {
    for headline in &templates.headline {
      let headline = render(headline, product);
      for description in &templates.description {
        let description = render(description, product);
        for cta in &templates.cta {
          creatives.push(Creative {
            product_id: product.id.clone(),
            headline: headline.clone(),
            description: description.clone(),
            cta: render(cta, product),
          });
        }
      }
    }
  }

  creatives
}
