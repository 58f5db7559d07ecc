use crate::{Calculation, Indicator, Price, Sample, StreamSample};

use std::fmt::{self, Debug};

/// One node of a [`Flow`]: consumes an input sample, maybe emits an output
/// sample.
///
/// Implemented for every [`Indicator`] whose calculation takes `I` and emits
/// a scalar. The emitted sample carries the input's time and `is_new` flag,
/// so a revision upstream becomes a revision downstream. `None` means the
/// node produced nothing this round (still cold with output suppressed) and
/// its subscribers are not advanced.
pub trait Stage<I: StreamSample> {
    /// Processes one sample and returns the published output, if any.
    fn process(&mut self, input: &I) -> Option<Sample>;
}

impl<I, C> Stage<I> for Indicator<C>
where
    I: StreamSample,
    C: Calculation<Input = I, Output = Price>,
{
    #[inline]
    fn process(&mut self, input: &I) -> Option<Sample> {
        let value = self.update(input)?;
        Some(if input.is_new() {
            Sample::new(input.time(), value)
        } else {
            Sample::revision(input.time(), value)
        })
    }
}

/// Handle to a node registered in a [`Flow`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

enum Node<I> {
    Root(Box<dyn Stage<I>>),
    Chained {
        upstream: NodeId,
        stage: Box<dyn Stage<Sample>>,
    },
}

/// A graph of indicators driven by one input stream.
///
/// Root nodes receive every pushed input; chained nodes receive the output
/// samples of the node they subscribe to. A node can only subscribe to an
/// already-registered upstream node, so the graph is acyclic by
/// construction, and there is no rewiring after the fact. Fan-out is
/// synchronous, in registration order.
///
/// # Example
///
/// ```
/// use pulse_ta::{Flow, Sample, Sma, SmaConfig};
/// use std::num::NonZero;
///
/// let nz = |n| NonZero::new(n).unwrap();
///
/// // Smooth twice: SMA(2) feeding SMA(2).
/// let mut flow = Flow::new();
/// let fast = flow.add(Sma::new(SmaConfig::new(nz(2))));
/// let smooth = flow.chain(fast, Sma::new(SmaConfig::new(nz(2))));
///
/// for (t, price) in [(1, 10.0), (2, 20.0), (3, 30.0), (4, 40.0)] {
///     flow.push(&Sample::new(t, price));
/// }
///
/// // SMA(2) of [25, 35] = 30
/// assert_eq!(flow.value(smooth).map(|s| s.value()), Some(30.0));
/// ```
pub struct Flow<I> {
    nodes: Vec<Node<I>>,
    last: Vec<Option<Sample>>,
    round: Vec<Option<Sample>>,
}

impl<I: StreamSample> Flow<I> {
    /// Empty flow.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            last: Vec::new(),
            round: Vec::new(),
        }
    }

    /// Registers a root node, fed every pushed input directly.
    pub fn add(&mut self, stage: impl Stage<I> + 'static) -> NodeId {
        self.push_node(Node::Root(Box::new(stage)))
    }

    /// Registers a node subscribed to `upstream`'s output stream.
    ///
    /// # Panics
    ///
    /// Panics if `upstream` was not returned by this flow.
    pub fn chain(&mut self, upstream: NodeId, stage: impl Stage<Sample> + 'static) -> NodeId {
        assert!(
            upstream.0 < self.nodes.len(),
            "unknown upstream node {upstream:?}"
        );
        let id = self.push_node(Node::Chained {
            upstream,
            stage: Box::new(stage),
        });
        tracing::debug!(node = id.0, upstream = upstream.0, "chained flow node");
        id
    }

    fn push_node(&mut self, node: Node<I>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.last.push(None);
        self.round.push(None);
        id
    }

    /// Drives one input sample through the whole graph.
    ///
    /// Nodes are visited in registration order; a subscriber always follows
    /// its upstream, so one pass suffices. Output samples keep the input's
    /// `is_new` flag: an upstream revision propagates as a revision all the
    /// way down.
    pub fn push(&mut self, input: &I) {
        self.round.fill(None);

        for (i, node) in self.nodes.iter_mut().enumerate() {
            let out = match node {
                Node::Root(stage) => stage.process(input),
                Node::Chained { upstream, stage } => self.round[upstream.0]
                    .as_ref()
                    .and_then(|sample| stage.process(sample)),
            };
            if out.is_some() {
                self.last[i] = out;
            }
            self.round[i] = out;
        }
    }

    /// Latest output sample published by `node`, if any yet.
    #[must_use]
    pub fn value(&self, node: NodeId) -> Option<Sample> {
        self.last.get(node.0).copied().flatten()
    }

    /// Number of registered nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<I: StreamSample> Default for Flow<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> Debug for Flow<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flow")
            .field("nodes", &self.nodes.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{nz, sample};
    use crate::{Sma, SmaConfig};

    fn sma(length: usize) -> Sma {
        Sma::new(SmaConfig::new(nz(length)))
    }

    mod wiring {
        use super::*;

        #[test]
        fn root_sees_pushed_samples() {
            let mut flow = Flow::new();
            let id = flow.add(sma(2));
            flow.push(&sample(10.0, 1));
            flow.push(&sample(20.0, 2));
            assert_eq!(flow.value(id), Some(Sample::new(2, 15.0)));
        }

        #[test]
        fn cold_node_publishes_nothing() {
            let mut flow = Flow::new();
            let id = flow.add(sma(3));
            flow.push(&sample(10.0, 1));
            assert_eq!(flow.value(id), None);
        }

        #[test]
        fn chained_node_consumes_upstream_output() {
            let mut flow = Flow::new();
            let a = flow.add(sma(2));
            let b = flow.chain(a, sma(2));

            for (t, v) in [(1, 10.0), (2, 20.0), (3, 30.0), (4, 40.0)] {
                flow.push(&sample(v, t));
            }
            // A: 15, 25, 35 → B: SMA(2) of [25, 35] = 30
            assert_eq!(flow.value(b).map(|s| s.value()), Some(30.0));
        }

        #[test]
        fn downstream_warms_up_only_on_upstream_output() {
            let mut flow = Flow::new();
            let a = flow.add(sma(2));
            let b = flow.chain(a, sma(2));

            // A emits from t=2; B needs two of A's outputs.
            flow.push(&sample(10.0, 1));
            flow.push(&sample(20.0, 2));
            assert_eq!(flow.value(b), None);
            flow.push(&sample(30.0, 3));
            // B saw 15 and 25 → 20
            assert_eq!(flow.value(b).map(|s| s.value()), Some(20.0));
        }

        #[test]
        fn fan_out_in_registration_order() {
            let mut flow = Flow::new();
            let a = flow.add(sma(1));
            let first = flow.chain(a, sma(1));
            let second = flow.chain(a, sma(2));

            flow.push(&sample(10.0, 1));
            flow.push(&sample(30.0, 2));

            assert_eq!(flow.value(first).map(|s| s.value()), Some(30.0));
            assert_eq!(flow.value(second).map(|s| s.value()), Some(20.0));
        }

        #[test]
        #[should_panic(expected = "unknown upstream node")]
        fn chaining_to_foreign_id_panics() {
            let mut other = Flow::<Sample>::new();
            other.add(sma(1));

            let mut flow = Flow::<Sample>::new();
            let foreign = NodeId(0);
            // Empty flow: no node 0 yet.
            flow.chain(foreign, sma(1));
        }
    }

    mod revision {
        use super::*;
        use crate::test_util::revision;

        #[test]
        fn upstream_revision_is_downstream_revision() {
            let mut flow = Flow::new();
            let a = flow.add(sma(1));
            let b = flow.chain(a, sma(2));

            flow.push(&sample(10.0, 1));
            flow.push(&sample(20.0, 2));
            assert_eq!(flow.value(b).map(|s| s.value()), Some(15.0));

            flow.push(&revision(40.0, 2));
            let out = flow.value(b).unwrap();
            assert!(!out.is_new());
            assert_eq!(out.value(), 25.0);
        }

        #[test]
        fn revision_transparency_across_the_graph() {
            // Feeding v then revising to v' must match feeding v' directly.
            let mut revised = Flow::new();
            let ra = revised.add(sma(2));
            let rb = revised.chain(ra, sma(2));

            let mut direct = Flow::new();
            let da = direct.add(sma(2));
            let db = direct.chain(da, sma(2));

            for (t, v) in [(1, 10.0), (2, 20.0), (3, 30.0)] {
                revised.push(&sample(v, t));
                direct.push(&sample(v, t));
            }
            revised.push(&sample(44.0, 4));
            revised.push(&revision(40.0, 4));
            direct.push(&sample(40.0, 4));

            let value_of = |s: Option<Sample>| s.map(|s| s.value());
            assert_eq!(value_of(revised.value(rb)), value_of(direct.value(db)));
            assert_eq!(value_of(revised.value(ra)), value_of(direct.value(da)));

            // And the graphs stay in lockstep afterwards.
            revised.push(&sample(50.0, 5));
            direct.push(&sample(50.0, 5));
            assert_eq!(revised.value(rb), direct.value(db));
        }
    }

    mod bar_roots {
        use super::*;
        use crate::test_util::bar_close;
        use crate::{BarSample, Extract, PriceSource};

        #[test]
        fn extract_bridges_bars_into_scalar_chain() {
            let mut flow = Flow::<BarSample>::new();
            let close = flow.add(Extract::new(PriceSource::Close));
            let avg = flow.chain(close, sma(2));

            flow.push(&bar_close(10.0, 1));
            flow.push(&bar_close(20.0, 2));

            assert_eq!(flow.value(avg).map(|s| s.value()), Some(15.0));
        }
    }

    mod nan_propagation {
        use super::*;

        #[test]
        fn cold_nan_flows_through_without_panicking() {
            let mut flow = Flow::new();
            let a = flow.add(sma(3).nan_while_cold());
            let b = flow.chain(a, sma(1));

            flow.push(&sample(10.0, 1));
            let out = flow.value(b).unwrap();
            assert!(out.value().is_nan());
        }
    }
}
