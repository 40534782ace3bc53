//! Request routing: match a request path to a registered prefix and resolve it.

use bytes::Bytes;
use tracing::debug;

use crate::gate::Gate;
use crate::mime;
use crate::registry::RootRegistry;
use crate::resolver::{FileResolver, Resolution};

/// Response produced for an intercepted request.
#[derive(Debug, Clone, PartialEq)]
pub enum FileResponse {
    Found {
        filename: String,
        content_type: String,
        body: Bytes,
    },
    NotFound,
}

/// What to do with a request.
///
/// A request is answered at most once: routing returns one value and the
/// caller either sends that response or hands the request back to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Interception {
    /// No registered prefix matches; leave the request to the host.
    Passthrough,
    /// The request belongs to a prefix; answer with this response.
    Respond(FileResponse),
}

#[derive(Debug, Clone)]
pub struct RequestRouter {
    registry: RootRegistry,
    gate: Gate,
    resolver: FileResolver,
}

impl RequestRouter {
    pub fn new(registry: RootRegistry, gate: Gate, resolver: FileResolver) -> Self {
        Self {
            registry,
            gate,
            resolver,
        }
    }

    /// Route a request path.
    ///
    /// Waits for the registry load before looking anything up. When several
    /// prefixes match, only the longest one is resolved.
    pub async fn route(&self, path: &str) -> Interception {
        self.gate.ready().await;

        let snapshot = self.registry.snapshot().await;
        let Some((prefix, roots)) = snapshot.longest_match(path) else {
            return Interception::Passthrough;
        };

        let suffix = &path[prefix.len()..];
        debug!(
            "Request {} matched prefix {} ({} roots)",
            path,
            prefix,
            roots.len()
        );

        let response = match self.resolver.resolve(suffix, roots).await {
            Resolution::Found(file) => FileResponse::Found {
                content_type: mime::content_type(&file.filename),
                filename: file.filename,
                body: file.body,
            },
            Resolution::Missing => {
                debug!("Not found under {}: {}", prefix, path);
                FileResponse::NotFound
            }
        };
        Interception::Respond(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::root::{MemoryDirectory, RootHandle};
    use std::time::Duration;

    async fn ready_router() -> (RequestRouter, RootRegistry) {
        let registry = RootRegistry::new();
        let gate = Gate::new();
        gate.activate();
        gate.open();
        let resolver = FileResolver::new(vec!["index.html".to_string(), "index.htm".to_string()]);
        (RequestRouter::new(registry.clone(), gate, resolver), registry)
    }

    fn site(name: &str, files: &[(&str, &str)]) -> RootHandle {
        let tree = files
            .iter()
            .fold(MemoryDirectory::new(), |tree, (path, data)| {
                tree.with_file(path, *data)
            });
        RootHandle::memory(name, tree)
    }

    #[tokio::test]
    async fn test_unmatched_passes_through() {
        let (router, registry) = ready_router().await;
        registry
            .set("/app/", vec![site("app", &[("a.txt", "a")])])
            .await;

        assert_eq!(router.route("/other/a.txt").await, Interception::Passthrough);
    }

    #[tokio::test]
    async fn test_found_with_content_type() {
        let (router, registry) = ready_router().await;
        registry
            .set("/app/", vec![site("app", &[("css/site.CSS", "body{}")])])
            .await;

        assert_eq!(
            router.route("/app/css/site.CSS").await,
            Interception::Respond(FileResponse::Found {
                filename: "site.CSS".to_string(),
                content_type: "text/css; charset=utf-8".to_string(),
                body: Bytes::from_static(b"body{}"),
            })
        );
    }

    #[tokio::test]
    async fn test_matched_but_missing_is_not_found() {
        let (router, registry) = ready_router().await;
        registry
            .set("/app/", vec![site("app", &[("a.txt", "a")])])
            .await;

        assert_eq!(
            router.route("/app/b.txt").await,
            Interception::Respond(FileResponse::NotFound)
        );
    }

    #[tokio::test]
    async fn test_longest_prefix_only() {
        let (router, registry) = ready_router().await;
        registry
            .set("/a/", vec![site("outer", &[("b/c", "outer")])])
            .await;
        registry
            .set("/a/b/", vec![site("inner", &[("other", "inner")])])
            .await;

        // `/a/`'s roots would have the file, but `/a/b/` is the longer match.
        assert_eq!(
            router.route("/a/b/c").await,
            Interception::Respond(FileResponse::NotFound)
        );
    }

    #[tokio::test]
    async fn test_waits_for_gate() {
        let registry = RootRegistry::new();
        let gate = Gate::new();
        let router = RequestRouter::new(
            registry.clone(),
            gate.clone(),
            FileResolver::new(vec!["index.html".to_string()]),
        );

        let pending = tokio::spawn(async move { router.route("/app/a.txt").await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!pending.is_finished());

        registry
            .set("/app/", vec![site("app", &[("a.txt", "loaded")])])
            .await;
        gate.activate();
        gate.open();

        let result = tokio::time::timeout(Duration::from_secs(1), pending)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(
            result,
            Interception::Respond(FileResponse::Found { .. })
        ));
    }
}
