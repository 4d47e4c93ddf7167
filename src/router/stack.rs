//! Frame stack backing in-app back navigation.

use super::hash::{HOME, ROOT};

/// One rendered view, tagged with the route that produced it.
#[derive(Debug)]
pub struct Frame<V> {
    tag: String,
    view: V,
    hidden: bool,
}

impl<V> Frame<V> {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }
}

/// Effect of one navigation on the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Stack cleared; the caller should navigate to `redirect_to`.
    Reset { redirect_to: &'static str },
    /// Top frame discarded; the previous frame is visible again, unrendered.
    Revealed,
    /// A fresh frame was rendered.
    Rendered,
}

/// Ordered `(route tag, view)` frames; at most one frame is visible.
///
/// With `test_mode` the stack is bypassed: every navigation re-renders into a
/// single persistent frame so no hidden state accumulates.
#[derive(Debug)]
pub struct FrameStack<V> {
    frames: Vec<Frame<V>>,
    test_mode: bool,
}

impl<V> FrameStack<V> {
    pub fn new(test_mode: bool) -> Self {
        Self {
            frames: Vec::new(),
            test_mode,
        }
    }

    /// Apply a navigation to `tag`, calling `render` only when a new view is needed.
    pub fn navigate(&mut self, tag: &str, render: impl FnOnce() -> V) -> Transition {
        if tag == HOME {
            self.frames.clear();
            return Transition::Reset { redirect_to: ROOT };
        }

        if self.test_mode {
            let frame = Frame {
                tag: tag.to_string(),
                view: render(),
                hidden: false,
            };
            self.frames.clear();
            self.frames.push(frame);
            return Transition::Rendered;
        }

        let depth = self.frames.len();
        if depth >= 2 && self.frames[depth - 2].tag == tag {
            self.frames.pop();
            if let Some(previous) = self.frames.last_mut() {
                previous.hidden = false;
            }
            return Transition::Revealed;
        }

        for frame in &mut self.frames {
            frame.hidden = true;
        }
        self.frames.push(Frame {
            tag: tag.to_string(),
            view: render(),
            hidden: false,
        });
        Transition::Rendered
    }

    /// The visible frame, if any.
    pub fn current(&self) -> Option<&Frame<V>> {
        self.frames.last().filter(|frame| !frame.hidden)
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[Frame<V>] {
        &self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visible_count<V>(stack: &FrameStack<V>) -> usize {
        stack.frames().iter().filter(|frame| !frame.is_hidden()).count()
    }

    #[test]
    fn push_hides_previous_frames() {
        let mut stack = FrameStack::new(false);

        assert_eq!(stack.navigate("/a", || 1), Transition::Rendered);
        assert_eq!(stack.navigate("/b", || 2), Transition::Rendered);

        assert_eq!(stack.depth(), 2);
        assert_eq!(visible_count(&stack), 1);
        assert_eq!(stack.current().map(|frame| *frame.view()), Some(2));
    }

    #[test]
    fn returning_to_previous_tag_pops_without_render() {
        let mut stack = FrameStack::new(false);
        stack.navigate("/a", || 1);
        stack.navigate("/b", || 2);

        let transition = stack.navigate("/a", || panic!("must not re-render"));

        assert_eq!(transition, Transition::Revealed);
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.current().map(|frame| frame.tag()), Some("/a"));
        assert_eq!(visible_count(&stack), 1);
    }

    #[test]
    fn same_tag_as_top_renders_again() {
        let mut stack = FrameStack::new(false);
        stack.navigate("/a", || 1);

        assert_eq!(stack.navigate("/a", || 2), Transition::Rendered);
        assert_eq!(stack.depth(), 2);
    }

    #[test]
    fn home_clears_any_depth() {
        for depth in 0..4 {
            let mut stack = FrameStack::new(false);
            for index in 0..depth {
                stack.navigate(&format!("/p/{index}"), || index);
            }

            assert_eq!(
                stack.navigate(HOME, || unreachable!()),
                Transition::Reset { redirect_to: ROOT }
            );
            assert_eq!(stack.depth(), 0);
            assert!(stack.current().is_none());
        }
    }

    #[test]
    fn test_mode_keeps_a_single_frame() {
        let mut stack = FrameStack::new(true);
        let mut renders = 0;

        for tag in ["/a", "/b", "/a", "/b"] {
            let transition = stack.navigate(tag, || {
                renders += 1;
                renders
            });
            assert_eq!(transition, Transition::Rendered);
            assert_eq!(stack.depth(), 1);
        }

        assert_eq!(renders, 4);
        assert_eq!(stack.current().map(|frame| frame.tag()), Some("/b"));
    }
}
