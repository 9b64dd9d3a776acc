// SPDX-License-Identifier: MIT OR Apache-2.0
//! Texture compositor used by the command line.
//!
//! No pixels are touched: a composed texture is described by its source plus
//! the operation applied, which is what a renderer needs to reproduce it.

use futures::future::BoxFuture;
use matgraph::value::format_float;
use matgraph::{CompositeError, TextureCompositor, TextureRef, Value};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Describes composed textures by URL fragment, reusing identical results
#[derive(Debug, Default)]
pub struct DescribingCompositor {
    cache: Mutex<HashMap<String, TextureRef>>,
}

impl DescribingCompositor {
    /// Create a compositor with an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct composed textures
    pub async fn cached(&self) -> usize {
        self.cache.lock().await.len()
    }
}

impl TextureCompositor for DescribingCompositor {
    fn multiply_texture_by_color<'a>(
        &'a self,
        texture: &'a TextureRef,
        color: &'a Value,
    ) -> BoxFuture<'a, Result<TextureRef, CompositeError>> {
        Box::pin(async move {
            let factors = match color {
                Value::Scalar(s) => vec![*s; 3],
                Value::Vector(v) if !v.is_empty() => v.clone(),
                _ => return Err(CompositeError::UnsupportedOperand(color.clone())),
            };
            let tag = factors
                .iter()
                .map(|c| format_float(*c))
                .collect::<Vec<_>>()
                .join(",");
            let key = format!("{}*{}", texture.id, tag);

            let mut cache = self.cache.lock().await;
            if let Some(hit) = cache.get(&key) {
                return Ok(hit.clone());
            }

            tracing::debug!("Composing {}", key);
            let composed = TextureRef {
                id: key.clone(),
                url: format!("{}#multiply={}", texture.url, tag),
            };
            cache.insert(key, composed.clone());
            Ok(composed)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    fn brick() -> TextureRef {
        TextureRef {
            id: "brick".into(),
            url: "textures/brick.png".into(),
        }
    }

    #[test]
    fn test_multiply_describes_operation() {
        let compositor = DescribingCompositor::new();
        let red = Value::Vector(vec![1.0, 0.0, 0.0]);
        let composed = block_on(compositor.multiply_texture_by_color(&brick(), &red)).unwrap();
        assert_eq!(composed.url, "textures/brick.png#multiply=1.0,0.0,0.0");
        assert_eq!(composed.id, "brick*1.0,0.0,0.0");
    }

    #[test]
    fn test_scalar_broadcasts_and_results_are_reused() {
        let compositor = DescribingCompositor::new();
        let half = Value::Scalar(0.5);
        let a = block_on(compositor.multiply_texture_by_color(&brick(), &half)).unwrap();
        let b = block_on(compositor.multiply_texture_by_color(&brick(), &half)).unwrap();
        assert_eq!(a, b);
        assert_eq!(block_on(compositor.cached()), 1);
    }

    #[test]
    fn test_texture_operand_rejected() {
        let compositor = DescribingCompositor::new();
        let other = Value::Texture(brick());
        let result = block_on(compositor.multiply_texture_by_color(&brick(), &other));
        assert!(matches!(result, Err(CompositeError::UnsupportedOperand(_))));
    }
}
