//! Stack of views; the top one receives input.

use thiserror::Error;

use super::view::View;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("view stack is full ({max_depth} views), not pushing {view}")]
pub struct ViewStackFull {
    pub max_depth: usize,
    pub view: &'static str,
}

/// The root view is always at the bottom and is never popped.
pub struct ViewStack {
    root: View,
    stack: Vec<View>,
    max_depth: usize,
}

impl ViewStack {
    /// `max_depth` counts the root view.
    pub fn new(root: View, max_depth: usize) -> Self {
        Self {
            root,
            stack: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Number of views including the root.
    pub fn depth(&self) -> usize {
        self.stack.len() + 1
    }

    pub fn current(&self) -> &View {
        self.stack.last().unwrap_or(&self.root)
    }

    pub fn current_mut(&mut self) -> &mut View {
        self.stack.last_mut().unwrap_or(&mut self.root)
    }

    pub fn push(&mut self, view: View) -> Result<(), ViewStackFull> {
        if self.depth() >= self.max_depth {
            return Err(ViewStackFull {
                max_depth: self.max_depth,
                view: view.name(),
            });
        }
        tracing::trace!("push view {}", view.name());
        self.stack.push(view);
        Ok(())
    }

    /// Remove the top view.
    ///
    /// Returns false when only the root is left, meaning the app should exit.
    pub fn pop(&mut self) -> bool {
        match self.stack.pop() {
            Some(view) => {
                tracing::trace!("pop view {}", view.name());
                true
            }
            None => false,
        }
    }

    /// Pop everything above the root.
    pub fn return_to_root(&mut self) {
        while self.pop() {}
    }
}
