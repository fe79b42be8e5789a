//! Reads network records from the JSON shape DevTools and Lighthouse use.

use std::fs::File;
use std::io::BufReader;

use serde::Deserialize;

use crate::audit::STACK_DEPTH_LIMIT;
use crate::error::{InvalidInputError, Result};
use crate::records::{self, CallFrame, CallStack, Initiator, NetworkRecord};
use crate::types::{InitiatorType, ResourceType};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    url: String,
    #[serde(default)]
    resource_type: Option<String>,
    #[serde(default)]
    initiator: Option<RawInitiator>,
}

#[derive(Deserialize)]
struct RawInitiator {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    stack: Option<RawStack>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStack {
    call_frames: Vec<RawFrame>,
    #[serde(default)]
    parent: Option<Box<RawStack>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFrame {
    #[serde(default)]
    function_name: String,
    url: String,
    #[serde(default)]
    line_number: u32,
    #[serde(default)]
    column_number: u32,
}

impl From<RawFrame> for CallFrame {
    fn from(raw: RawFrame) -> Self {
        Self {
            function_name: raw.function_name,
            url: raw.url,
            line: raw.line_number,
            column: raw.column_number,
        }
    }
}

impl From<RawStack> for CallStack {
    fn from(raw: RawStack) -> Self {
        // Walk the parent chain iteratively, then rebuild it from the outermost stack inwards.
        let mut levels = vec![];
        let mut next = Some(raw);
        while let Some(stack) = next {
            next = stack.parent.map(|parent| *parent);
            levels.push(stack.call_frames);
        }
        levels.into_iter().rev().fold(None, |parent: Option<CallStack>, frames| {
            Some(CallStack {
                frames: frames.into_iter().map(CallFrame::from).collect(),
                parent: parent.map(Box::new),
            })
        }).unwrap_or_default()
    }
}

impl From<RawRecord> for NetworkRecord {
    fn from(raw: RawRecord) -> Self {
        let initiator = match raw.initiator {
            Some(initiator) => Initiator {
                kind: initiator.kind.as_deref().map(InitiatorType::from).unwrap_or(InitiatorType::Other),
                stack: initiator.stack.map(CallStack::from),
            },
            None => Initiator::default(),
        };
        Self {
            url: raw.url,
            resource_type: raw.resource_type.as_deref().map(ResourceType::from).unwrap_or(ResourceType::Other),
            initiator,
        }
    }
}

/// Parses and validates a JSON array of network records.
pub fn parse_records(json: &str, max_stack_depth: usize) -> Result<Vec<NetworkRecord>> {
    check_depth_limit(max_stack_depth)?;
    let raw: Vec<RawRecord> = serde_json::from_str(json)?;
    finish(raw, max_stack_depth)
}

/// Reads network records from a JSON file.
pub fn read_from_file(file: &str, max_stack_depth: usize) -> Result<Vec<NetworkRecord>> {
    check_depth_limit(max_stack_depth)?;
    let file = File::open(file)?;
    let raw: Vec<RawRecord> = serde_json::from_reader(BufReader::new(file))?;
    finish(raw, max_stack_depth)
}

fn check_depth_limit(max_stack_depth: usize) -> Result<()> {
    if max_stack_depth > STACK_DEPTH_LIMIT {
        return Err(InvalidInputError::StackDepthLimit {
            requested: max_stack_depth,
            limit: STACK_DEPTH_LIMIT,
        });
    }
    Ok(())
}

fn finish(raw: Vec<RawRecord>, max_stack_depth: usize) -> Result<Vec<NetworkRecord>> {
    let records: Vec<NetworkRecord> = raw.into_iter().map(NetworkRecord::from).collect();
    records::validate(&records, max_stack_depth)?;
    tracing::debug!(count = records.len(), "read network records");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested_parents(parents: usize) -> String {
        let frame = r#"{ "url": "https://example.com/a.js" }"#;
        let mut stack = format!(r#"{{ "callFrames": [{}] }}"#, frame);
        for _ in 0..parents {
            stack = format!(r#"{{ "callFrames": [{}], "parent": {} }}"#, frame, stack);
        }
        format!(r#"[{{ "url": "https://example.com/req", "initiator": {{ "type": "script", "stack": {} }} }}]"#, stack)
    }

    const RECORDS: &str = r#"[
        {
            "url": "https://example.com/lib.js",
            "resourceType": "Script",
            "initiator": { "type": "parser" }
        },
        {
            "url": "https://example.com/data",
            "resourceType": "XHR",
            "initiator": {
                "type": "script",
                "stack": {
                    "callFrames": [
                        { "functionName": "load", "url": "https://example.com/lib.js", "lineNumber": 3, "columnNumber": 14 }
                    ],
                    "parent": {
                        "description": "setTimeout",
                        "callFrames": [
                            { "functionName": "", "url": "https://example.com/", "lineNumber": 0, "columnNumber": 0 }
                        ]
                    }
                }
            }
        },
        { "url": "https://example.com/" }
    ]"#;

    #[test]
    fn parses_records() {
        let records = parse_records(RECORDS, 64).unwrap();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].resource_type, ResourceType::Script);
        assert_eq!(records[0].initiator.kind, InitiatorType::Parser);
        assert!(records[0].initiator.stack.is_none());

        let stack = records[1].initiator.stack.as_ref().unwrap();
        assert_eq!(records[1].initiator.kind, InitiatorType::Script);
        assert_eq!(stack.frames[0].function_name, "load");
        assert_eq!(stack.frames[0].line, 3);
        assert_eq!(stack.frames[0].column, 14);
        assert_eq!(stack.chain().count(), 2);
        assert_eq!(stack.parent.as_ref().unwrap().frames[0].url, "https://example.com/");

        assert_eq!(records[2].resource_type, ResourceType::Other);
        assert_eq!(records[2].initiator, Initiator::default());
    }

    #[test]
    fn rejects_missing_fields() {
        let missing_frames = r#"[{ "url": "a.js", "initiator": { "type": "script", "stack": {} } }]"#;
        assert!(matches!(parse_records(missing_frames, 64), Err(InvalidInputError::Json(_))));

        let missing_url = r#"[{ "resourceType": "Script" }]"#;
        assert!(matches!(parse_records(missing_url, 64), Err(InvalidInputError::Json(_))));
    }

    #[test]
    fn rejects_empty_url() {
        let empty = r#"[{ "url": "", "resourceType": "Script" }]"#;
        assert!(matches!(parse_records(empty, 64), Err(InvalidInputError::EmptyUrl { .. })));
    }

    #[test]
    fn deepest_configurable_stack_is_decoded() {
        let records = parse_records(&nested_parents(STACK_DEPTH_LIMIT), STACK_DEPTH_LIMIT).unwrap();
        assert_eq!(records[0].initiator.stack.as_ref().unwrap().chain().count(), STACK_DEPTH_LIMIT + 1);

        match parse_records(&nested_parents(STACK_DEPTH_LIMIT + 10), STACK_DEPTH_LIMIT) {
            Err(InvalidInputError::StackTooDeep { depth, max, .. }) => {
                assert_eq!(depth, STACK_DEPTH_LIMIT + 1);
                assert_eq!(max, STACK_DEPTH_LIMIT);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn depth_beyond_limit_is_rejected() {
        assert!(matches!(
            parse_records(&nested_parents(200), 500),
            Err(InvalidInputError::StackDepthLimit { requested: 500, .. })
        ));
    }

    #[test]
    fn missing_file() {
        assert!(matches!(read_from_file("does/not/exist.json", 64), Err(InvalidInputError::Io(_))));
    }
}
