use crate::error::{InvalidInputError, Result};
use crate::types::{InitiatorType, ResourceType};

/// Identifies a network record by its position in the captured record list.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RecordId(usize);

impl From<usize> for RecordId {
    fn from(v: usize) -> Self {
        Self(v)
    }
}

impl RecordId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// A single captured network request.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkRecord {
    pub url: String,
    pub resource_type: ResourceType,
    pub initiator: Initiator,
}

impl NetworkRecord {
    /// A record with no initiator stack.
    pub fn new(url: impl Into<String>, resource_type: ResourceType) -> Self {
        Self {
            url: url.into(),
            resource_type,
            initiator: Initiator::default(),
        }
    }

    /// Attaches a script initiator with the given call stack.
    pub fn with_stack(mut self, stack: CallStack) -> Self {
        self.initiator = Initiator {
            kind: InitiatorType::Script,
            stack: Some(stack),
        };
        self
    }

    pub fn is_script(&self) -> bool {
        self.resource_type == ResourceType::Script
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Initiator {
    pub kind: InitiatorType,
    pub stack: Option<CallStack>,
}

impl Default for Initiator {
    fn default() -> Self {
        Self {
            kind: InitiatorType::Other,
            stack: None,
        }
    }
}

/// A JavaScript call stack captured when a request was issued. `parent` holds the stack of the
/// code that scheduled this one across an async boundary.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CallStack {
    pub frames: Vec<CallFrame>,
    pub parent: Option<Box<CallStack>>,
}

impl CallStack {
    pub fn new(frames: Vec<CallFrame>) -> Self {
        Self { frames, parent: None }
    }

    pub fn with_parent(mut self, parent: CallStack) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    /// Iterates over this stack followed by each of its ancestors, innermost first.
    pub fn chain(&self) -> impl Iterator<Item = &CallStack> {
        std::iter::successors(Some(self), |stack| stack.parent.as_deref())
    }

    /// All frames of this stack and its ancestors, in order, visiting at most `max_depth` parents.
    pub fn all_frames(&self, max_depth: usize) -> impl Iterator<Item = &CallFrame> {
        self.chain()
            .take(max_depth.saturating_add(1))
            .flat_map(|stack| stack.frames.iter())
    }
}

/// One frame of a call stack. `url` names the script that was executing, which is how frames
/// are tied back to the network record that loaded that script.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CallFrame {
    pub function_name: String,
    pub url: String,
    pub line: u32,
    pub column: u32,
}

impl CallFrame {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// Checks the minimal shape every record must have before any traversal happens.
pub fn validate(records: &[NetworkRecord], max_stack_depth: usize) -> Result<()> {
    for (i, record) in records.iter().enumerate() {
        let id = RecordId::from(i);
        if record.url.is_empty() {
            return Err(InvalidInputError::EmptyUrl { record: id });
        }
        if let Some(stack) = &record.initiator.stack {
            // Stop counting once past the limit; the exact depth beyond it is irrelevant.
            let depth = stack.chain().take(max_stack_depth.saturating_add(2)).count() - 1;
            if depth > max_stack_depth {
                return Err(InvalidInputError::StackTooDeep {
                    record: id,
                    depth,
                    max: max_stack_depth,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested_stack(parents: usize) -> CallStack {
        (0..parents).fold(CallStack::new(vec![CallFrame::new("https://a.com/0.js")]), |inner, i| {
            CallStack::new(vec![CallFrame::new(format!("https://a.com/{}.js", i + 1))]).with_parent(inner)
        })
    }

    #[test]
    fn frames_are_flattened_inner_first() {
        let stack = CallStack::new(vec![CallFrame::new("inner1.js"), CallFrame::new("inner2.js")])
            .with_parent(CallStack::new(vec![CallFrame::new("outer.js")]));
        let urls: Vec<_> = stack.all_frames(64).map(|f| f.url.as_str()).collect();
        assert_eq!(urls, vec!["inner1.js", "inner2.js", "outer.js"]);
        assert_eq!(stack.chain().count(), 2);
    }

    #[test]
    fn frame_walk_is_bounded() {
        let stack = nested_stack(10);
        assert_eq!(stack.chain().count(), 11);
        assert_eq!(stack.all_frames(3).count(), 4);
        assert_eq!(stack.all_frames(usize::MAX).count(), 11);
    }

    #[test]
    fn unbounded_depth_does_not_overflow() {
        let records = vec![NetworkRecord::new("https://a.com/a.js", ResourceType::Script).with_stack(nested_stack(5))];
        assert!(validate(&records, usize::MAX).is_ok());
    }

    #[test]
    fn validate_rejects_empty_url() {
        let records = vec![
            NetworkRecord::new("https://a.com/a.js", ResourceType::Script),
            NetworkRecord::new("", ResourceType::Script),
        ];
        match validate(&records, 64) {
            Err(InvalidInputError::EmptyUrl { record }) => assert_eq!(record, RecordId::from(1)),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn validate_rejects_deep_stacks() {
        let records = vec![NetworkRecord::new("https://a.com/a.js", ResourceType::Script).with_stack(nested_stack(5))];
        assert!(validate(&records, 5).is_ok());
        match validate(&records, 4) {
            Err(InvalidInputError::StackTooDeep { record, depth, max }) => {
                assert_eq!(record, RecordId::from(0));
                assert_eq!(depth, 5);
                assert_eq!(max, 4);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn record_id_display() {
        assert_eq!(format!("{}", RecordId::from(12)), "r12");
    }
}
