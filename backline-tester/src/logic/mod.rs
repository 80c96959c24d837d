pub mod reports;
pub mod roster;
pub mod scenarios;
pub mod simulation;
pub mod tester;

pub use roster::Roster;
pub use scenarios::{get_scenario, list_scenarios, scenario_keys};
pub use simulation::{CampaignAggregate, CampaignRecord, aggregate_campaigns, run_campaigns};
pub use tester::*;
