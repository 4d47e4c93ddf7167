//! Hash router
//!
//! Maps URL fragments to views and keeps the frame stack that emulates back
//! navigation without re-rendering:
//!
//! - **Hash**: parsing and canonical route tags
//! - **Routes**: pure dispatch table to view descriptors and titles
//! - **Stack**: frame bookkeeping (push, reveal, reset, test-mode bypass)

mod hash;
mod routes;
mod stack;

pub use hash::{HOME, HashRoute, ROOT};
pub use routes::{RoutedView, ViewDescriptor, resolve};
pub use stack::{Frame, FrameStack, Transition};

use tracing::debug;

use crate::config::RouterSettings;
use crate::domain::session::SessionUser;

/// Produces a view for a resolved route.
pub trait Renderer {
    type View;

    fn render(&mut self, route: &RoutedView) -> Self::View;
}

/// A rendered page: the route it came from and the renderer's view handle.
#[derive(Debug)]
pub struct Page<V> {
    pub route: RoutedView,
    pub view: V,
}

pub struct Router<R: Renderer> {
    renderer: R,
    stack: FrameStack<Page<R::View>>,
}

impl<R: Renderer> Router<R> {
    pub fn new(renderer: R, settings: RouterSettings) -> Self {
        Self {
            renderer,
            stack: FrameStack::new(settings.test_mode),
        }
    }

    /// Navigate to `hash`.
    ///
    /// The route is resolved against `session` only when a new frame is
    /// rendered; revealing a previous frame keeps it exactly as it was.
    pub fn navigate(&mut self, hash: &str, session: Option<&SessionUser>) -> Transition {
        let route = HashRoute::parse(hash);
        let renderer = &mut self.renderer;
        let transition = self.stack.navigate(route.tag(), || {
            let routed = resolve(&route, session);
            let view = renderer.render(&routed);
            Page {
                route: routed,
                view,
            }
        });

        debug!(
            tag = route.tag(),
            ?transition,
            depth = self.stack.depth(),
            "Navigation applied"
        );
        transition
    }

    /// The visible page, if any.
    pub fn current(&self) -> Option<&Page<R::View>> {
        self.stack.current().map(Frame::view)
    }

    /// Title of the visible page.
    pub fn title(&self) -> Option<&str> {
        self.current().map(|page| page.route.title.as_str())
    }

    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;

    /// Counts renders and hands out reference-counted views for identity checks.
    #[derive(Default)]
    struct CountingRenderer {
        renders: usize,
    }

    impl Renderer for CountingRenderer {
        type View = Rc<String>;

        fn render(&mut self, route: &RoutedView) -> Self::View {
            self.renders += 1;
            Rc::new(route.title.clone())
        }
    }

    fn router(test_mode: bool) -> Router<CountingRenderer> {
        Router::new(CountingRenderer::default(), RouterSettings { test_mode })
    }

    #[test]
    fn back_navigation_reuses_the_same_frame() {
        let mut router = router(false);

        router.navigate("#/user/alice", None);
        let first = Rc::clone(&router.current().expect("page").view);

        router.navigate("#/realm/DAO", None);
        assert_eq!(router.title(), Some("Realm DAO"));

        assert_eq!(router.navigate("#/user/alice", None), Transition::Revealed);
        let back = &router.current().expect("page").view;

        assert!(Rc::ptr_eq(&first, back));
        assert_eq!(router.renderer().renders, 2);
        assert_eq!(router.title(), Some("@alice"));
    }

    #[test]
    fn home_resets_and_requests_root() {
        let mut router = router(false);
        router.navigate("#/inbox", None);
        router.navigate("#/post/1", None);

        assert_eq!(
            router.navigate("#/home", None),
            Transition::Reset { redirect_to: ROOT }
        );
        assert_eq!(router.depth(), 0);
        assert!(router.current().is_none());
    }

    #[test]
    fn unauthorized_view_still_takes_a_frame() {
        let mut router = router(false);

        router.navigate("#/", None);
        router.navigate("#/settings", None);
        assert!(matches!(
            router.current().map(|page| &page.route.view),
            Some(ViewDescriptor::Unauthorized { .. })
        ));
        assert_eq!(router.depth(), 2);

        assert_eq!(router.navigate("#/", None), Transition::Revealed);
        assert_eq!(router.depth(), 1);
    }

    #[test]
    fn test_mode_rerenders_every_time() {
        let mut router = router(true);

        router.navigate("#/user/alice", None);
        router.navigate("#/realm/DAO", None);
        router.navigate("#/user/alice", None);

        assert_eq!(router.renderer().renders, 3);
        assert_eq!(router.depth(), 1);
    }

    #[test]
    fn test_mode_home_still_resets() {
        let mut router = router(true);
        router.navigate("#/inbox", None);

        assert_eq!(
            router.navigate("#/home", None),
            Transition::Reset { redirect_to: ROOT }
        );
        assert_eq!(router.depth(), 0);
        assert!(router.current().is_none());
        assert_eq!(router.renderer().renders, 1);
    }

    #[test]
    fn repeating_the_visible_route_pushes_a_fresh_frame() {
        let mut router = router(false);
        router.navigate("#/user/alice", None);
        let first = Rc::clone(&router.current().expect("page").view);

        assert_eq!(router.navigate("#/user/alice/", None), Transition::Rendered);

        assert_eq!(router.depth(), 2);
        assert_eq!(router.renderer().renders, 2);
        assert!(!Rc::ptr_eq(&first, &router.current().expect("page").view));
    }
}
