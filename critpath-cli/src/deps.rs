//! Prints the script dependency edges between all records.

use critpath::audit::AuditConfig;
use critpath::index::RequestIndex;
use critpath::records::NetworkRecord;

pub fn main(records: &[NetworkRecord], config: &AuditConfig) -> anyhow::Result<()> {
    println!("{}", render(records, config)?);
    Ok(())
}

fn render(records: &[NetworkRecord], config: &AuditConfig) -> anyhow::Result<String> {
    #[derive(serde::Serialize)]
    struct Dependency<'a> {
        from: String,
        from_url: &'a str,
        to: String,
        to_url: &'a str,
    }

    #[derive(serde::Serialize)]
    struct Dependencies<'a> {
        has_cycle: bool,
        dependencies: Vec<Dependency<'a>>,
    }

    config.validate()?;
    let index = RequestIndex::new(records);
    let graph = index.dependency_graph(config.max_stack_depth);

    let dependencies = graph.edges().map(|(from, to)| Dependency {
        from: format!("{}", from),
        from_url: &index.record(from).url,
        to: format!("{}", to),
        to_url: &index.record(to).url,
    }).collect();

    let output = Dependencies {
        has_cycle: graph.has_cycle(),
        dependencies,
    };
    Ok(serde_json::to_string(&output)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use critpath::records::{CallFrame, CallStack};
    use critpath::types::ResourceType;

    #[test]
    fn renders_cyclic_dependencies() {
        let records = vec![
            NetworkRecord::new("https://a.com/a.js", ResourceType::Script)
                .with_stack(CallStack::new(vec![CallFrame::new("https://a.com/b.js")])),
            NetworkRecord::new("https://a.com/b.js", ResourceType::Script)
                .with_stack(CallStack::new(vec![CallFrame::new("https://a.com/a.js")])),
        ];
        let json = render(&records, &AuditConfig::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["has_cycle"], true);
        assert_eq!(value["dependencies"].as_array().unwrap().len(), 2);
        assert_eq!(value["dependencies"][0]["from"], "r0");
        assert_eq!(value["dependencies"][0]["to_url"], "https://a.com/b.js");
    }

    #[test]
    fn renders_no_dependencies() {
        let records = vec![NetworkRecord::new("https://a.com/a.js", ResourceType::Script)];
        let json = render(&records, &AuditConfig::default()).unwrap();
        assert_eq!(json, r#"{"has_cycle":false,"dependencies":[]}"#);
    }
}
