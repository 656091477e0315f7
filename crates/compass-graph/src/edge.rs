use std::sync::Arc;

use compass_core::error::Result;

/// Terminal sentinel. An edge targeting `END` marks successful completion.
pub const END: &str = "__end__";

/// Marker bound for router labels. Routers return a variant of a closed
/// enum per branching stage, never an open string, so an unregistered
/// label is a wiring defect caught when the edge table is consulted.
pub trait RouteLabel: Eq + std::hash::Hash + std::fmt::Debug + Send + Sync + 'static {}

impl<T> RouteLabel for T where T: Eq + std::hash::Hash + std::fmt::Debug + Send + Sync + 'static {}

/// Type-erased routing closure built by the builder from a user router and
/// its label-to-stage table. Returns the chosen successor stage name, or
/// `UnknownRoute` if the router produced a label with no registered target.
pub type RouterFn<S> = Arc<dyn Fn(&S) -> Result<String> + Send + Sync>;

/// Outgoing transition group of a stage. Every non-terminal stage has
/// exactly one.
pub enum Transition<S> {
    /// Always advance to `to`.
    Unconditional { to: String },
    /// Consult the router against the post-stage state.
    Conditional {
        /// All registered target stage names, for build-time validation.
        targets: Vec<String>,
        route: RouterFn<S>,
    },
}

impl<S> Transition<S> {
    /// Stage names this transition can reach.
    pub fn targets(&self) -> Vec<&str> {
        match self {
            Transition::Unconditional { to } => vec![to.as_str()],
            Transition::Conditional { targets, .. } => {
                targets.iter().map(String::as_str).collect()
            }
        }
    }
}

impl<S> Clone for Transition<S> {
    fn clone(&self) -> Self {
        match self {
            Transition::Unconditional { to } => Transition::Unconditional { to: to.clone() },
            Transition::Conditional { targets, route } => Transition::Conditional {
                targets: targets.clone(),
                route: Arc::clone(route),
            },
        }
    }
}

impl<S> std::fmt::Debug for Transition<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transition::Unconditional { to } => {
                f.debug_struct("Unconditional").field("to", to).finish()
            }
            Transition::Conditional { targets, .. } => f
                .debug_struct("Conditional")
                .field("targets", targets)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconditional_targets() {
        let t: Transition<()> = Transition::Unconditional { to: "next".into() };
        assert_eq!(t.targets(), vec!["next"]);
    }

    #[test]
    fn test_conditional_targets() {
        let t: Transition<()> = Transition::Conditional {
            targets: vec!["a".into(), "b".into()],
            route: Arc::new(|_| Ok("a".into())),
        };
        assert_eq!(t.targets(), vec!["a", "b"]);
    }
}
