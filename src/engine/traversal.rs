use std::collections::HashSet;

use tracing::instrument;

use crate::{
    domain::{
        equal, DiffRecord, DocumentReference, ErrorKind, PairingNote, Policy, Table,
        TraversalResult,
    },
    engine::CancelFlag,
    storage::{DocumentParser, ParseError},
};

type Pair = (DocumentReference, DocumentReference);

/// Compares two document trees in lockstep.
///
/// Children are paired by position and visited depth first, most recently
/// pushed pair first. Under [`Policy::Fast`] this order decides which
/// difference is reported; the overall verdict does not depend on it.
///
/// All parsing happens on the thread that calls [`Traversal::run`], one
/// document at a time.
#[derive(Debug)]
pub struct Traversal<P> {
    parser: P,
    policy: Policy,
    cancel: CancelFlag,
}

/// Why a walk ended early.
enum Halt {
    Parse(ParseError),
    Cancelled,
}

impl From<ParseError> for Halt {
    fn from(error: ParseError) -> Self {
        Self::Parse(error)
    }
}

impl<P> Traversal<P>
where
    P: DocumentParser,
{
    /// Creates a traversal reading documents through `parser`.
    pub fn new(parser: P, policy: Policy) -> Self {
        Self {
            parser,
            policy,
            cancel: CancelFlag::new(),
        }
    }

    /// Makes the traversal stop at the next step once `cancel` is raised.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Compares the trees rooted at `golden` and `target`.
    ///
    /// Any document that cannot be parsed aborts the whole comparison; the
    /// result then carries the error and no differences.
    #[instrument(level = "debug", skip(self), fields(policy = %self.policy))]
    pub fn run(&self, golden: &DocumentReference, target: &DocumentReference) -> TraversalResult {
        match self.walk(golden, target) {
            Ok(result) => result,
            Err(Halt::Parse(error)) => {
                tracing::warn!("comparison aborted: {error}");
                TraversalResult::failed(error.into())
            }
            Err(Halt::Cancelled) => {
                tracing::debug!("comparison cancelled");
                TraversalResult::failed(ErrorKind::Cancelled)
            }
        }
    }

    fn walk(
        &self,
        golden: &DocumentReference,
        target: &DocumentReference,
    ) -> Result<TraversalResult, Halt> {
        let mut diffs = Vec::new();
        let mut notes = Vec::new();

        let (golden_root, target_root) = self.parse_pair(golden, target)?;
        if !equal(&golden_root, &target_root) {
            tracing::info!("root documents differ: {golden} | {target}");
            diffs.push(DiffRecord::new(golden.clone(), target.clone()));
            if self.policy.stops_at_first() {
                return Ok(TraversalResult::completed(diffs, notes));
            }
        }

        let mut stack: Vec<Pair> = Vec::new();
        push_children(&mut stack, &mut notes, &golden_root, &target_root);

        // Both sides share one set, so a reference reached from either tree
        // blocks any later pair that contains it.
        let mut visited: HashSet<DocumentReference> = HashSet::new();

        while let Some((golden_child, target_child)) = stack.pop() {
            if self.cancel.is_cancelled() {
                return Err(Halt::Cancelled);
            }
            tracing::debug!(
                "stack size {}: {golden_child} | {target_child}",
                stack.len() + 1
            );

            if visited.contains(&golden_child) || visited.contains(&target_child) {
                continue;
            }
            visited.insert(golden_child.clone());
            visited.insert(target_child.clone());

            let (golden_table, target_table) = self.parse_pair(&golden_child, &target_child)?;

            if !equal(&golden_table, &target_table) {
                tracing::info!("documents differ: {golden_child} | {target_child}");
                diffs.push(DiffRecord::new(golden_child, target_child));
                if self.policy.stops_at_first() {
                    break;
                }
            }

            push_children(&mut stack, &mut notes, &golden_table, &target_table);
        }

        Ok(TraversalResult::completed(diffs, notes))
    }

    /// Parses both sides of a pair, golden first. A golden-side failure
    /// means the target side is never read.
    fn parse_pair(
        &self,
        golden: &DocumentReference,
        target: &DocumentReference,
    ) -> Result<(Table, Table), ParseError> {
        let golden = self.parser.parse(golden)?;
        let target = self.parser.parse(target)?;
        Ok((golden, target))
    }
}

/// Pushes the positionally zipped children of a pair onto the stack.
///
/// Surplus children on the longer side and positions linked on only one side
/// are not descended; either case is recorded as a [`PairingNote`].
fn push_children(
    stack: &mut Vec<Pair>,
    notes: &mut Vec<PairingNote>,
    golden: &Table,
    target: &Table,
) {
    let golden_children = golden.children();
    let target_children = target.children();
    let mut one_sided = false;

    for pair in golden_children.iter().zip(target_children) {
        match pair {
            (Some(g), Some(t)) => stack.push((g.clone(), t.clone())),
            (None, None) => {}
            _ => one_sided = true,
        }
    }

    let note = if golden_children.len() != target_children.len() {
        Some((golden_children.len(), target_children.len()))
    } else if one_sided {
        Some((golden.linked_children(), target.linked_children()))
    } else {
        None
    };

    if let Some((golden_count, target_count)) = note {
        tracing::info!(
            "child lists do not pair up: {} ({golden_count}) | {} ({target_count})",
            golden.reference(),
            target.reference()
        );
        notes.push(PairingNote {
            golden: golden.reference().clone(),
            target: target.reference().clone(),
            golden_children: golden_count,
            target_children: target_count,
        });
    }
}

/// Compares the trees rooted at `golden` and `target` without a deadline.
pub fn traverse<P>(
    parser: P,
    golden: &DocumentReference,
    target: &DocumentReference,
    policy: Policy,
) -> TraversalResult
where
    P: DocumentParser,
{
    Traversal::new(parser, policy).run(golden, target)
}
