//! Jump-to-highlight navigation
//!
//! Locates a rendered marker by highlight id, scrolls it into view and
//! emphasizes it briefly. Nothing persisted changes.

use std::sync::Arc;
use std::time::Duration;

use crate::config::NavigationConfig;
use crate::dom::{visit, Fragment, NodePath};
use crate::error::{Error, Result};
use crate::html::HighlightConfig;

/// A rendered marker element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerTarget {
    pub highlight_id: String,
    /// Path of the first marker element carrying the id
    pub path: NodePath,
}

/// The display surface the navigator drives
pub trait Viewport: Send + Sync {
    /// Scroll so the marker is centered
    fn scroll_into_view(&self, target: &MarkerTarget);

    fn set_emphasis(&self, target: &MarkerTarget, emphasized: bool);
}

pub struct Navigator<V> {
    viewport: Arc<V>,
    emphasis: Duration,
    retry_delay: Duration,
    id_attribute: String,
}

impl<V: Viewport + 'static> Navigator<V> {
    pub fn new(viewport: Arc<V>, navigation: &NavigationConfig, markers: &HighlightConfig) -> Self {
        Self {
            viewport,
            emphasis: navigation.emphasis(),
            retry_delay: navigation.retry_delay(),
            id_attribute: markers.id_attribute.clone(),
        }
    }

    /// Find the marker for `highlight_id`; a highlight split across several
    /// text nodes resolves to its first segment
    pub fn locate(&self, root: &Fragment, highlight_id: &str) -> Option<MarkerTarget> {
        visit::find_element(&root.children, &|el| {
            el.name == "mark" && el.attr(&self.id_attribute) == Some(highlight_id)
        })
        .map(|(path, _)| MarkerTarget {
            highlight_id: highlight_id.to_string(),
            path,
        })
    }

    /// Scroll to the marker and emphasize it. The emphasis is cleared by a
    /// spawned task, so this must run inside a tokio runtime.
    pub fn navigate(&self, root: &Fragment, highlight_id: &str) -> Result<MarkerTarget> {
        let target = self
            .locate(root, highlight_id)
            .ok_or_else(|| Error::NotFound(format!("No marker for highlight {}", highlight_id)))?;

        tracing::debug!(
            highlight_id = highlight_id,
            path = ?target.path,
            "Navigating to highlight"
        );
        self.viewport.scroll_into_view(&target);
        self.viewport.set_emphasis(&target, true);

        let viewport = Arc::clone(&self.viewport);
        let emphasis = self.emphasis;
        let cleared = target.clone();
        tokio::spawn(async move {
            tokio::time::sleep(emphasis).await;
            viewport.set_emphasis(&cleared, false);
        });

        Ok(target)
    }

    /// Navigate, retrying once after the retry delay when the marker has not
    /// been rendered yet. `render` yields the current root on each attempt.
    pub async fn navigate_with_retry<F>(
        &self,
        mut render: F,
        highlight_id: &str,
    ) -> Result<MarkerTarget>
    where
        F: FnMut() -> Fragment,
    {
        match self.navigate(&render(), highlight_id) {
            Err(Error::NotFound(_)) => {
                tracing::debug!(
                    highlight_id = highlight_id,
                    "Marker not rendered yet, retrying once"
                );
                tokio::time::sleep(self.retry_delay).await;
                self.navigate(&render(), highlight_id)
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Scroll(NodePath),
        Emphasis(NodePath, bool),
    }

    #[derive(Default)]
    struct RecordingViewport {
        events: Mutex<Vec<Event>>,
    }

    impl RecordingViewport {
        fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }
    }

    impl Viewport for RecordingViewport {
        fn scroll_into_view(&self, target: &MarkerTarget) {
            self.events.lock().unwrap().push(Event::Scroll(target.path.clone()));
        }

        fn set_emphasis(&self, target: &MarkerTarget, emphasized: bool) {
            self.events
                .lock()
                .unwrap()
                .push(Event::Emphasis(target.path.clone(), emphasized));
        }
    }

    const ANNOTATED: &str = r#"<p>Hello <mark class="highlight highlight-yellow" data-highlight-id="h1">world</mark></p><p><b><mark class="highlight highlight-blue" data-highlight-id="h2">bold</mark></b> and <mark class="highlight highlight-blue" data-highlight-id="h2">more</mark></p>"#;

    fn navigator() -> (Arc<RecordingViewport>, Navigator<RecordingViewport>) {
        let viewport = Arc::new(RecordingViewport::default());
        let navigator = Navigator::new(
            Arc::clone(&viewport),
            &NavigationConfig::default(),
            &HighlightConfig::default(),
        );
        (viewport, navigator)
    }

    #[test]
    fn test_locate_first_segment() {
        let (_, navigator) = navigator();
        let root = Fragment::parse(ANNOTATED).unwrap();

        let target = navigator.locate(&root, "h2").unwrap();
        assert_eq!(target.path, vec![1, 0, 0]);
        assert_eq!(navigator.locate(&root, "h1").unwrap().path, vec![0, 1]);
        assert!(navigator.locate(&root, "h3").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigate_scrolls_and_clears_emphasis() {
        let (viewport, navigator) = navigator();
        let root = Fragment::parse(ANNOTATED).unwrap();

        let target = navigator.navigate(&root, "h1").unwrap();
        assert_eq!(
            viewport.events(),
            vec![
                Event::Scroll(target.path.clone()),
                Event::Emphasis(target.path.clone(), true),
            ]
        );

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert_eq!(viewport.events().len(), 2);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(
            viewport.events().last(),
            Some(&Event::Emphasis(target.path, false))
        );
    }

    #[tokio::test]
    async fn test_navigate_miss_does_not_scroll() {
        let (viewport, navigator) = navigator();
        let root = Fragment::parse("<p>No markers here</p>").unwrap();

        let result = navigator.navigate(&root, "h1");
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert!(viewport.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_finds_late_marker() {
        let (viewport, navigator) = navigator();
        let mut renders = 0;
        let render = || {
            renders += 1;
            let html = if renders == 1 { "<p>Hello world</p>" } else { ANNOTATED };
            Fragment::parse(html).unwrap()
        };

        let target = navigator.navigate_with_retry(render, "h1").await.unwrap();
        assert_eq!(target.highlight_id, "h1");
        assert_eq!(renders, 2);
        assert_eq!(viewport.events().first(), Some(&Event::Scroll(vec![0, 1])));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_gives_up_after_one_attempt() {
        let (viewport, navigator) = navigator();
        let mut renders = 0;
        let render = || {
            renders += 1;
            Fragment::parse("<p>Hello world</p>").unwrap()
        };

        let result = navigator.navigate_with_retry(render, "h1").await;
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert_eq!(renders, 2);
        assert!(viewport.events().is_empty());
    }
}
