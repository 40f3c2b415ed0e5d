// src/protocol/pipeline.rs

//! Drives encode → teleport → decode for each character of a message.

use super::channel::{OutcomeTally, TeleportationChannel};
use super::config::{FailurePolicy, TransmitConfig};
use super::decoder::decode;
use super::encoder::encode;
use crate::core::TeleportError;
use crate::simulation::Backend;
use std::thread;
use tracing::{debug, error, info, warn};

/// Sequential message transmission over one backend.
///
/// Characters share nothing but the backend; each is encoded, teleported
/// over `batches` channel runs and decoded before the next one starts.
pub struct MessagePipeline<B> {
    channel: TeleportationChannel<B>,
    trial_budget: u32,
    batches: u32,
    failure_policy: FailurePolicy,
}

impl<B: Backend> MessagePipeline<B> {
    /// Builds a pipeline over `backend`.
    ///
    /// # Errors
    /// `TeleportError::InvalidConfig` if `config` fails validation.
    pub fn new(backend: B, config: &TransmitConfig) -> Result<Self, TeleportError> {
        config.validate()?;
        Ok(Self {
            channel: TeleportationChannel::new(backend, config.shots),
            trial_budget: config.trial_budget,
            batches: config.batches,
            failure_policy: config.failure_policy,
        })
    }

    /// The channel characters are sent through.
    pub fn channel(&self) -> &TeleportationChannel<B> {
        &self.channel
    }

    /// Releases the backend.
    pub fn into_backend(self) -> B {
        self.channel.into_backend()
    }

    /// Teleports a single character and decodes it.
    ///
    /// Batches are accumulated into one tally. A batch that stays degenerate
    /// or faults through its whole trial budget ends accumulation early, and
    /// the samples gathered so far are decoded. A fault before any sample
    /// was gathered fails the character.
    pub fn transmit_char(&mut self, character: char) -> Result<char, TeleportError> {
        let (state, quadrant) = encode(character)?;
        debug!(?character, %state, %quadrant, "encoded");

        let mut tally = OutcomeTally::default();
        for batch in 1..=self.batches {
            let batch_tally = match self.channel.run(&state, self.trial_budget) {
                Ok(batch_tally) => batch_tally,
                Err(err @ TeleportError::ChannelTransientFault { .. }) if !tally.is_degenerate() => {
                    warn!(?character, batch, error = %err, "channel faulted, decoding accumulated samples");
                    break;
                }
                Err(err) => return Err(err),
            };
            tally += batch_tally;
            if batch_tally.is_degenerate() {
                warn!(?character, batch, "channel exhausted its trial budget, stopping accumulation");
                break;
            }
        }

        let decoded = decode(&tally, quadrant)?;
        info!(?character, ?decoded, %tally, "character received");
        Ok(decoded)
    }

    /// Lazily yields one result per input character, in order.
    pub fn transmit<'a>(&'a mut self, message: &'a str) -> impl Iterator<Item = Result<char, TeleportError>> + 'a {
        message.chars().map(move |character| self.transmit_char(character))
    }

    /// Transmits a whole message, applying the configured failure policy.
    ///
    /// # Errors
    /// Under [`FailurePolicy::Abort`], the first per-character failure.
    pub fn transmit_message(&mut self, message: &str) -> Result<String, TeleportError> {
        let policy = self.failure_policy;
        let mut decoded = String::with_capacity(message.len());
        for (index, (character, result)) in message.chars().zip(self.transmit(message)).enumerate() {
            decoded.push(resolve(policy, index, character, result)?);
        }
        Ok(decoded)
    }
}

/// Applies `policy` to one character's outcome.
fn resolve(
    policy: FailurePolicy,
    index: usize,
    character: char,
    result: Result<char, TeleportError>,
) -> Result<char, TeleportError> {
    match (result, policy) {
        (Ok(decoded), _) => Ok(decoded),
        (Err(err), FailurePolicy::Placeholder(placeholder)) => {
            error!(index, ?character, error = %err, "character lost, emitting placeholder");
            Ok(placeholder)
        }
        (Err(err), FailurePolicy::Abort) => {
            error!(index, ?character, error = %err, "aborting transmission");
            Err(err)
        }
    }
}

/// Transmits `message` on up to `config.workers` scoped threads.
///
/// Every character gets its own pipeline and a backend built by
/// `make_backend(index)`, where `index` is the character's position in the
/// message. Output order matches input order. Under
/// [`FailurePolicy::Abort`] all characters are still processed and the
/// earliest failure is returned.
pub fn transmit_parallel<B, F>(message: &str, config: &TransmitConfig, make_backend: F) -> Result<String, TeleportError>
where
    B: Backend,
    F: Fn(usize) -> B + Sync,
{
    config.validate()?;
    let characters: Vec<char> = message.chars().collect();
    if characters.is_empty() {
        return Ok(String::new());
    }

    let workers = config.workers.min(characters.len());
    let chunk_size = characters.len().div_ceil(workers);
    debug!(workers, chunk_size, "starting parallel transmission");

    let results: Vec<Result<char, TeleportError>> = thread::scope(|scope| {
        let make_backend = &make_backend;
        let handles: Vec<_> = characters
            .chunks(chunk_size)
            .enumerate()
            .map(|(worker, chunk)| {
                let offset = worker * chunk_size;
                scope.spawn(move || {
                    chunk
                        .iter()
                        .enumerate()
                        .map(|(i, &character)| {
                            MessagePipeline::new(make_backend(offset + i), config)?.transmit_char(character)
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap_or_else(|payload| std::panic::resume_unwind(payload)))
            .collect()
    });

    let mut decoded = String::with_capacity(message.len());
    for (index, (character, result)) in characters.into_iter().zip(results).enumerate() {
        decoded.push(resolve(config.failure_policy, index, character, result)?);
    }
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits::Circuit;
    use crate::core::BackendFault;
    use crate::operations::Operation;
    use crate::protocol::config::DEFAULT_PLACEHOLDER;
    use crate::simulation::Counts;

    /// Answers with counts exactly proportional to `cos² θ` of the prepared state.
    #[derive(Default)]
    struct IdealBackend {
        calls: u32,
    }

    impl Backend for IdealBackend {
        fn name(&self) -> &str {
            "ideal"
        }

        fn submit(&mut self, circuit: &Circuit, shots: u32) -> Result<Counts, BackendFault> {
            self.calls += 1;
            let [alpha, _] = circuit
                .operations()
                .iter()
                .find_map(|op| match op {
                    Operation::Initialize { amplitudes, .. } => Some(*amplitudes),
                    _ => None,
                })
                .ok_or(BackendFault::Unreachable { message: "no payload".to_string() })?;
            let bit0 = (f64::from(shots) * alpha * alpha).round() as u64;
            Ok([("0 1 0", bit0), ("1 0 1", u64::from(shots) - bit0)].into_iter().collect())
        }
    }

    /// Never produces a sample.
    #[derive(Default)]
    struct SilentBackend {
        calls: u32,
    }

    impl Backend for SilentBackend {
        fn name(&self) -> &str {
            "silent"
        }

        fn submit(&mut self, _circuit: &Circuit, _shots: u32) -> Result<Counts, BackendFault> {
            self.calls += 1;
            Ok(Counts::new())
        }
    }

    /// Answers like [`IdealBackend`] for a fixed number of calls, then faults.
    struct FailingAfter {
        inner: IdealBackend,
        healthy_calls: u32,
    }

    impl Backend for FailingAfter {
        fn name(&self) -> &str {
            "failing-after"
        }

        fn submit(&mut self, circuit: &Circuit, shots: u32) -> Result<Counts, BackendFault> {
            if self.inner.calls >= self.healthy_calls {
                self.inner.calls += 1;
                return Err(BackendFault::Unreachable { message: "link dropped".to_string() });
            }
            self.inner.submit(circuit, shots)
        }
    }

    fn ideal_config() -> TransmitConfig {
        TransmitConfig { shots: 1_000_000, batches: 1, ..Default::default() }
    }

    #[test]
    fn test_message_round_trips_in_order() -> Result<(), TeleportError> {
        let mut pipeline = MessagePipeline::new(IdealBackend::default(), &ideal_config())?;
        assert_eq!(pipeline.transmit_message("Hello World")?, "Hello World");
        Ok(())
    }

    #[test]
    fn test_transmit_is_lazy() -> Result<(), TeleportError> {
        let mut pipeline = MessagePipeline::new(IdealBackend::default(), &ideal_config())?;
        let first = pipeline.transmit("abc").next();
        assert_eq!(first, Some(Ok('a')));
        assert_eq!(pipeline.channel().backend().calls, 1);
        Ok(())
    }

    #[test]
    fn test_batches_accumulate() -> Result<(), TeleportError> {
        let config = TransmitConfig { shots: 10_000, batches: 4, ..Default::default() };
        let mut pipeline = MessagePipeline::new(IdealBackend::default(), &config)?;
        assert_eq!(pipeline.transmit_char('K')?, 'K');
        assert_eq!(pipeline.into_backend().calls, 4);
        Ok(())
    }

    #[test]
    fn test_placeholder_marks_unencodable_character() -> Result<(), TeleportError> {
        let mut pipeline = MessagePipeline::new(IdealBackend::default(), &ideal_config())?;
        let decoded = pipeline.transmit_message("a€b")?;
        assert_eq!(decoded, format!("a{}b", DEFAULT_PLACEHOLDER));
        Ok(())
    }

    #[test]
    fn test_abort_policy_stops_at_first_failure() -> Result<(), TeleportError> {
        let config = TransmitConfig { failure_policy: FailurePolicy::Abort, ..ideal_config() };
        let mut pipeline = MessagePipeline::new(IdealBackend::default(), &config)?;
        let result = pipeline.transmit_message("a€b");
        assert!(matches!(result, Err(TeleportError::EncodingDomain { ordinal: 0x20AC, .. })));
        // 'b' was never sent.
        assert_eq!(pipeline.into_backend().calls, 1);
        Ok(())
    }

    #[test]
    fn test_silent_backend_costs_exactly_one_budget() -> Result<(), TeleportError> {
        let config = TransmitConfig { trial_budget: 12, batches: 5, ..Default::default() };
        let mut pipeline = MessagePipeline::new(SilentBackend::default(), &config)?;
        let result = pipeline.transmit_char('A');
        assert_eq!(result, Err(TeleportError::DecodeDegenerate { bit0: 0, bit1: 0 }));
        assert_eq!(pipeline.into_backend().calls, 12);
        Ok(())
    }

    #[test]
    fn test_fault_mid_accumulation_decodes_gathered_batches() -> Result<(), TeleportError> {
        let config = TransmitConfig { shots: 100_000, trial_budget: 4, batches: 10, ..Default::default() };
        let backend = FailingAfter { inner: IdealBackend::default(), healthy_calls: 3 };
        let mut pipeline = MessagePipeline::new(backend, &config)?;

        assert_eq!(pipeline.transmit_char('A')?, 'A');
        // Three usable batches, then one full budget of faults.
        assert_eq!(pipeline.into_backend().inner.calls, 3 + 4);
        Ok(())
    }

    #[test]
    fn test_fault_before_any_sample_fails_character() -> Result<(), TeleportError> {
        let config = TransmitConfig { trial_budget: 2, batches: 10, ..Default::default() };
        let backend = FailingAfter { inner: IdealBackend::default(), healthy_calls: 0 };
        let mut pipeline = MessagePipeline::new(backend, &config)?;

        assert!(matches!(
            pipeline.transmit_char('A'),
            Err(TeleportError::ChannelTransientFault { attempts: 2, .. })
        ));
        Ok(())
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = TransmitConfig { trial_budget: 0, ..Default::default() };
        assert!(matches!(
            MessagePipeline::new(IdealBackend::default(), &config),
            Err(TeleportError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_parallel_preserves_order() -> Result<(), TeleportError> {
        let config = TransmitConfig { workers: 3, ..ideal_config() };
        let message = "The quick brown fox ~ 0123";
        let decoded = transmit_parallel(message, &config, |_| IdealBackend::default())?;
        assert_eq!(decoded, message);
        Ok(())
    }

    #[test]
    fn test_parallel_applies_failure_policy() -> Result<(), TeleportError> {
        let config = TransmitConfig { workers: 2, failure_policy: FailurePolicy::Placeholder('#'), ..ideal_config() };
        assert_eq!(transmit_parallel("x€y", &config, |_| IdealBackend::default())?, "x#y");

        let config = TransmitConfig { failure_policy: FailurePolicy::Abort, ..config };
        assert!(transmit_parallel("x€y", &config, |_| IdealBackend::default()).is_err());
        assert_eq!(transmit_parallel("", &config, |_| IdealBackend::default())?, "");
        Ok(())
    }
}
