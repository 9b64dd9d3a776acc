// SPDX-License-Identifier: MIT OR Apache-2.0
//! Texture collaborators: id lookup and asynchronous compositing.

use crate::evaluation::{Channel, MaterialAttributes};
use crate::value::{PendingKind, PendingOperation, TextureRef, Value};
use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Id of the built-in placeholder texture
pub const DEFAULT_TEXTURE_ID: &str = "default_checker";

/// 2x2 grey/white checker as a PNG data URL
const DEFAULT_TEXTURE_DATA_URL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAIAAAACCAAAAABX3VL4AAAADklEQVR4nGPYv38/AwMAB4YCgUbnIsUAAAAASUVORK5CYII=";

/// Texture known to the library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureAsset {
    /// Location or inline data of the image
    pub data_url: String,
}

/// Looks textures up by id
pub trait TextureResolver {
    /// Get a texture, `None` when unknown
    fn get(&self, id: &str) -> Option<TextureAsset>;
}

/// In-memory texture table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextureLibrary {
    textures: IndexMap<String, TextureAsset>,
}

impl TextureLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a library holding the built-in placeholder
    pub fn with_builtin() -> Self {
        let mut library = Self::new();
        library.insert(DEFAULT_TEXTURE_ID, DEFAULT_TEXTURE_DATA_URL);
        library
    }

    /// Add or replace a texture
    pub fn insert(&mut self, id: impl Into<String>, data_url: impl Into<String>) {
        self.textures.insert(
            id.into(),
            TextureAsset {
                data_url: data_url.into(),
            },
        );
    }

    /// Number of textures
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Whether the library is empty
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

impl TextureResolver for TextureLibrary {
    fn get(&self, id: &str) -> Option<TextureAsset> {
        self.textures.get(id).cloned()
    }
}

/// Error from a compositing backend
#[derive(Debug, thiserror::Error)]
pub enum CompositeError {
    /// Operand cannot be applied to a texture
    #[error("Unsupported operand for texture compositing: {0:?}")]
    UnsupportedOperand(Value),

    /// Backend failure
    #[error("Compositing failed: {0}")]
    Backend(String),
}

/// Asynchronous image operations used to resolve pending values
pub trait TextureCompositor: Send + Sync {
    /// Multiply every texel of `texture` by `color`
    fn multiply_texture_by_color<'a>(
        &'a self,
        texture: &'a TextureRef,
        color: &'a Value,
    ) -> BoxFuture<'a, Result<TextureRef, CompositeError>>;
}

/// Run one pending operation on a compositor
pub async fn resolve_operation(
    operation: &PendingOperation,
    compositor: &dyn TextureCompositor,
) -> Result<TextureRef, CompositeError> {
    match operation.operation {
        PendingKind::Multiply => {
            compositor
                .multiply_texture_by_color(&operation.texture, &operation.color)
                .await
        }
    }
}

/// Await every pending channel and overwrite its placeholder.
///
/// Channels whose operation fails keep their placeholder and stay pending;
/// the first error is returned after all channels have been attempted.
pub async fn resolve_pending(
    attributes: &mut MaterialAttributes,
    compositor: &dyn TextureCompositor,
) -> Result<usize, CompositeError> {
    let work: Vec<(Channel, PendingOperation)> = attributes
        .pending
        .iter()
        .map(|(channel, op)| (*channel, op.clone()))
        .collect();

    let mut resolved = 0;
    let mut first_error = None;
    for (channel, operation) in work {
        match resolve_operation(&operation, compositor).await {
            Ok(texture) => {
                attributes.apply_resolved(channel, texture);
                resolved += 1;
            }
            Err(e) => {
                tracing::warn!("Failed to resolve pending {:?}: {}", channel, e);
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(resolved),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Evaluated;
    use futures::executor::block_on;

    struct TagCompositor;

    impl TextureCompositor for TagCompositor {
        fn multiply_texture_by_color<'a>(
            &'a self,
            texture: &'a TextureRef,
            color: &'a Value,
        ) -> BoxFuture<'a, Result<TextureRef, CompositeError>> {
            Box::pin(async move {
                match color {
                    Value::Texture(_) => Err(CompositeError::UnsupportedOperand(color.clone())),
                    _ => Ok(TextureRef {
                        id: format!("{}_tinted", texture.id),
                        url: format!("{}#tinted", texture.url),
                    }),
                }
            })
        }
    }

    fn brick() -> TextureRef {
        TextureRef {
            id: "brick".into(),
            url: "brick.png".into(),
        }
    }

    #[test]
    fn test_library_lookup() {
        let library = TextureLibrary::with_builtin();
        assert_eq!(library.len(), 1);
        assert!(library.get(DEFAULT_TEXTURE_ID).is_some());
        assert!(library.get("missing").is_none());
    }

    #[test]
    fn test_resolve_pending_overwrites_placeholder() {
        let mut attributes = MaterialAttributes::default();
        attributes.assign(
            Channel::BaseColor,
            Evaluated::Pending(PendingOperation {
                operation: PendingKind::Multiply,
                texture: brick(),
                color: Value::Vector(vec![1.0, 0.0, 0.0]),
            }),
            [1.0; 3],
        );

        let resolved = block_on(resolve_pending(&mut attributes, &TagCompositor)).expect("resolve");
        assert_eq!(resolved, 1);
        assert!(!attributes.has_pending());
        assert_eq!(
            attributes.base_color,
            Some(Value::Texture(TextureRef {
                id: "brick_tinted".into(),
                url: "brick.png#tinted".into(),
            }))
        );
    }

    #[test]
    fn test_failed_resolution_keeps_placeholder() {
        let mut attributes = MaterialAttributes::default();
        attributes.assign(
            Channel::BaseColor,
            Evaluated::Pending(PendingOperation {
                operation: PendingKind::Multiply,
                texture: brick(),
                color: Value::Texture(brick()),
            }),
            [1.0; 3],
        );

        assert!(block_on(resolve_pending(&mut attributes, &TagCompositor)).is_err());
        assert!(attributes.has_pending());
        assert_eq!(attributes.base_color, Some(Value::Vector(vec![1.0; 3])));
    }
}
