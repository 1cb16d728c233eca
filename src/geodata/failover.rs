use std::time::Duration;

/// One entry in the failover schedule: where to send the attempt, how long
/// to wait for it, and how long to back off before issuing it.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptPlan {
    pub endpoint: String,
    pub timeout: Duration,
    pub delay: Duration,
}

/// The full retry/failover sequence for one proximity query, flattened into
/// an ordered list so the exhaustive-attempt and monotonic-backoff
/// properties are testable without executing any network call.
///
/// Layout: primary at the initial timeout with no delay, primary again at
/// the extended timeout after the base backoff, then each mirror in order
/// at the extended timeout with the backoff doubling per attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptSchedule {
    attempts: Vec<AttemptPlan>,
}

impl AttemptSchedule {
    pub fn build(
        primary: &str,
        mirrors: &[String],
        initial_timeout: Duration,
        extended_timeout: Duration,
        backoff_base: Duration,
    ) -> Self {
        let mut attempts = vec![
            AttemptPlan {
                endpoint: primary.to_string(),
                timeout: initial_timeout,
                delay: Duration::ZERO,
            },
            AttemptPlan {
                endpoint: primary.to_string(),
                timeout: extended_timeout,
                delay: backoff_base,
            },
        ];

        let mut delay = backoff_base;
        for mirror in mirrors {
            delay *= 2;
            attempts.push(AttemptPlan {
                endpoint: mirror.clone(),
                timeout: extended_timeout,
                delay,
            });
        }

        Self { attempts }
    }

    pub fn attempts(&self) -> &[AttemptPlan] {
        &self.attempts
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schedule() -> AttemptSchedule {
        AttemptSchedule::build(
            "https://geodata.example.com",
            &[
                "https://mirror-a.example.com".to_string(),
                "https://mirror-b.example.com".to_string(),
            ],
            Duration::from_secs(10),
            Duration::from_secs(25),
            Duration::from_millis(500),
        )
    }

    #[test]
    fn test_schedule_length_is_two_plus_mirrors() {
        assert_eq!(sample_schedule().len(), 4);

        let no_mirrors = AttemptSchedule::build(
            "https://geodata.example.com",
            &[],
            Duration::from_secs(10),
            Duration::from_secs(25),
            Duration::from_millis(500),
        );
        assert_eq!(no_mirrors.len(), 2);
    }

    #[test]
    fn test_first_attempt_hits_primary_without_delay() {
        let schedule = sample_schedule();
        let first = &schedule.attempts()[0];
        assert_eq!(first.endpoint, "https://geodata.example.com");
        assert_eq!(first.timeout, Duration::from_secs(10));
        assert_eq!(first.delay, Duration::ZERO);
    }

    #[test]
    fn test_retry_widens_timeout_on_same_primary() {
        let schedule = sample_schedule();
        let retry = &schedule.attempts()[1];
        assert_eq!(retry.endpoint, "https://geodata.example.com");
        assert_eq!(retry.timeout, Duration::from_secs(25));
        assert_eq!(retry.delay, Duration::from_millis(500));
    }

    #[test]
    fn test_delays_grow_monotonically() {
        let schedule = sample_schedule();
        let delays: Vec<_> = schedule.attempts().iter().map(|a| a.delay).collect();
        assert!(delays.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(delays[2], Duration::from_secs(1));
        assert_eq!(delays[3], Duration::from_secs(2));
    }

    #[test]
    fn test_every_attempt_is_a_distinct_endpoint_timeout_pair() {
        let schedule = sample_schedule();
        let pairs: Vec<_> = schedule
            .attempts()
            .iter()
            .map(|a| (a.endpoint.clone(), a.timeout))
            .collect();
        for (i, a) in pairs.iter().enumerate() {
            for b in &pairs[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_mirrors_tried_in_configured_order() {
        let schedule = sample_schedule();
        assert_eq!(schedule.attempts()[2].endpoint, "https://mirror-a.example.com");
        assert_eq!(schedule.attempts()[3].endpoint, "https://mirror-b.example.com");
    }
}
