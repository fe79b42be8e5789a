//! Prints just the critical path tree of the ad request.

use critpath::audit::AuditConfig;
use critpath::index::RequestIndex;
use critpath::locator::{locate, AdRequestMatcher, Location, NotApplicableReason};
use critpath::records::NetworkRecord;
use critpath::tree::CriticalPathTreeBuilder;

pub fn main(records: &[NetworkRecord], matcher: &dyn AdRequestMatcher, config: &AuditConfig) -> anyhow::Result<()> {
    match render(records, matcher, config)? {
        Ok(json) => println!("{}", json),
        Err(reason) => eprintln!("No critical path available: {:?}", reason),
    }
    Ok(())
}

fn render(records: &[NetworkRecord], matcher: &dyn AdRequestMatcher, config: &AuditConfig) -> anyhow::Result<Result<String, NotApplicableReason>> {
    config.validate()?;
    match locate(records, matcher) {
        Location::Found(_, root) => {
            let index = RequestIndex::new(records);
            let path = CriticalPathTreeBuilder::new(&index, config.max_stack_depth).build(root);
            Ok(Ok(serde_json::to_string(&path.tree)?))
        }
        Location::NotApplicable(reason) => Ok(Err(reason)),
    }
}
