//! Prints the scored critical path report for the ad request.

use critpath::audit::{audit, AuditConfig};
use critpath::locator::AdRequestMatcher;
use critpath::records::NetworkRecord;

pub fn main(records: &[NetworkRecord], matcher: &dyn AdRequestMatcher, config: &AuditConfig) -> anyhow::Result<()> {
    println!("{}", render(records, matcher, config)?);
    Ok(())
}

fn render(records: &[NetworkRecord], matcher: &dyn AdRequestMatcher, config: &AuditConfig) -> anyhow::Result<String> {
    let report = audit(records, matcher, config)?;
    Ok(serde_json::to_string(&report)?)
}
