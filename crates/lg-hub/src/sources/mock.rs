//! # Mock Source
//!
//! Generates a plausible leads fixture: activity spread over the last week,
//! claimed and locked leads carrying an owner and claim time, finished calls
//! carrying a duration. Some rows land up to two days in the future, which
//! live (`prev`) pages must filter out.

use super::{LeadSource, SourceError};
use chrono::{DateTime, Duration, Utc};
use lg_core::{CallStatus, Lead, LeadStatus, Outcome};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const COMPANIES: [&str; 5] = ["Acme Corp", "Tech Solutions", "Global Inc", "StartupXYZ", "Enterprise Ltd"];
const VISITORS: [&str; 5] = ["John Doe", "Jane Smith", "Bob Johnson", "Alice Brown", "Charlie Wilson"];

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

pub struct MockSource {
    rows: usize,
    seed: Option<u64>,
}

impl MockSource {
    pub fn new(rows: usize, seed: Option<u64>) -> Self {
        Self { rows, seed }
    }
}

#[async_trait::async_trait]
impl LeadSource for MockSource {
    fn kind(&self) -> &'static str {
        "mock"
    }

    async fn fetch(&self) -> Result<Vec<Lead>, SourceError> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(generate(&mut rng, self.rows, lg_core::time::now_millis()))
    }
}

fn pick<T: Copy, R: Rng>(rng: &mut R, values: &[T]) -> T {
    values[rng.gen_range(0..values.len())]
}

fn millis_within<R: Rng>(rng: &mut R, span_ms: i64) -> Duration {
    Duration::milliseconds(rng.gen_range(0..span_ms))
}

/// `count` rows relative to `now`, newest first.
pub fn generate<R: Rng>(rng: &mut R, count: usize, now: DateTime<Utc>) -> Vec<Lead> {
    let mut rows: Vec<Lead> = (0..count)
        .map(|i| {
            let seen = now - millis_within(rng, 7 * DAY_MS);
            let status = pick(rng, LeadStatus::ALL);
            let call_status = pick(rng, CallStatus::ALL);
            let claimed = matches!(status, LeadStatus::Claimed | LeadStatus::Locked);

            let mut lead = Lead::new(format!("lead-{i:03}"), seen + millis_within(rng, 2 * DAY_MS));
            lead.company_id = format!("company-{}", rng.gen_range(0..5));
            lead.visitor_id = format!("visitor-{i}");
            lead.status = status;
            lead.call_status = call_status;
            if claimed {
                lead.claimed_by = Some(format!("user-{}", rng.gen_range(0..10)));
                lead.claim_at = Some(seen + millis_within(rng, DAY_MS));
            }
            lead.slack_id = rng.gen_bool(0.5).then(|| format!("slack-{i}"));
            lead.call_id = (call_status != CallStatus::NotStarted).then(|| format!("call-{i}"));
            lead.notes = rng.gen_bool(0.3).then(|| format!("Notes for lead {i}"));
            lead.visitor_name = Some(pick(rng, &VISITORS).to_string());
            lead.company_name = Some(pick(rng, &COMPANIES).to_string());
            lead.response_time = Some(rng.gen_range(5..125));
            if call_status == CallStatus::Finished {
                lead.call_duration = Some(rng.gen_range(5..65));
            }
            if rng.gen_bool(0.7) {
                lead.outcome = Some(pick(rng, Outcome::ALL));
            }
            lead
        })
        .collect();

    rows.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
    rows
}
