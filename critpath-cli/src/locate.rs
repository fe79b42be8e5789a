//! Prints the URL and record id of the ad request.

use critpath::locator::{locate, AdRequestMatcher, Location, NotApplicableReason};
use critpath::records::NetworkRecord;

pub fn main(records: &[NetworkRecord], matcher: &dyn AdRequestMatcher) -> anyhow::Result<()> {
    match render(records, matcher) {
        Ok(line) => println!("{}", line),
        Err(reason) => eprintln!("No ad request located: {:?}", reason),
    }
    Ok(())
}

fn render(records: &[NetworkRecord], matcher: &dyn AdRequestMatcher) -> Result<String, NotApplicableReason> {
    match locate(records, matcher) {
        Location::Found(id, record) => Ok(format!("{}\t{}", id, record.url)),
        Location::NotApplicable(reason) => Err(reason),
    }
}
