use std::sync::Arc;
use std::thread;

use crossbeam_channel::bounded;
use serde::Serialize;

use crate::axis_interface::{InputWord, OutputRecord};
use crate::math::fixed::CFix;
use crate::prelude::{ProcessingStage, StageConfig, StageError, StageResult};
use crate::processing::buffer_pool::BufferPool;
use crate::processing::doppler::DopplerStage;
use crate::processing::matched_filter::MatchedFilterStage;
use crate::processing::matrix::RangePulseMatrix;
use crate::processing::reference::ReferenceSpectrum;
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::MetricsRecorder;

/// Diagnostic counters returned after a completed run. Both equal
/// `range_bins * pulse_count` unless the Doppler pass stalled.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PipelineReport {
    pub doppler_input_count: u32,
    pub doppler_output_count: u32,
}

/// Two-phase pipeline driver.
///
/// Phase 1 runs the matched filter and the matrix writer as concurrent
/// producer/consumer stages over a shallow bounded queue; the stages being
/// concurrent is what makes a depth below `range_bins` safe. Phase 2 never
/// starts before every row is written and sealed.
pub struct RadarPipeline {
    config: StageConfig,
    reference: Arc<ReferenceSpectrum>,
    logger: LogManager,
    metrics: MetricsRecorder,
}

impl RadarPipeline {
    pub fn new(config: StageConfig, reference: Arc<ReferenceSpectrum>) -> StageResult<Self> {
        config.validate()?;
        if reference.len() != config.range_bins {
            return Err(StageError::InvalidInput(format!(
                "reference spectrum holds {} bins, config wants {}",
                reference.len(),
                config.range_bins
            )));
        }
        Ok(Self {
            config,
            reference,
            logger: LogManager::new(),
            metrics: MetricsRecorder::new(),
        })
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Processes one full burst: exactly `pulse_count` pulses of
    /// `range_bins` packed words each. A stream of any other length is
    /// rejected up front, never truncated or zero-filled.
    pub fn run(&self, input: &[InputWord]) -> StageResult<(Vec<OutputRecord>, PipelineReport)> {
        let range_bins = self.config.range_bins;
        let pulse_count = self.config.pulse_count;
        let total = self.config.total_samples();

        if input.len() != total {
            return Err(StageError::InvalidInput(format!(
                "input stream carries {} words, run needs exactly {}",
                input.len(),
                total
            )));
        }

        self.metrics.reset();
        let mut matrix = RangePulseMatrix::new(pulse_count, range_bins);

        self.logger.record("RadarPipeline phase 1 start");
        self.run_compression_phase(input, &mut matrix)?;
        matrix.seal()?;
        self.logger.record("RadarPipeline phase 1 complete, store sealed");

        self.logger.record("RadarPipeline phase 2 start");
        let records = self.run_doppler_phase(&matrix)?;
        self.logger.record("RadarPipeline phase 2 complete");

        let (doppler_input_count, doppler_output_count) = self.metrics.snapshot();
        Ok((
            records,
            PipelineReport {
                doppler_input_count,
                doppler_output_count,
            },
        ))
    }

    fn run_compression_phase(
        &self,
        input: &[InputWord],
        matrix: &mut RangePulseMatrix,
    ) -> StageResult<()> {
        let range_bins = self.config.range_bins;
        let pulse_count = self.config.pulse_count;
        let matrix_ref = &mut *matrix;

        thread::scope(|scope| {
            let (tx, rx) = bounded::<CFix>(self.config.compress_fifo_depth);

            let compressor = scope.spawn(move || -> StageResult<()> {
                let mut stage = MatchedFilterStage::new(self.reference.clone());
                stage.initialize(&self.config)?;
                for pulse_words in input.chunks(range_bins) {
                    let pulse: Vec<CFix> = pulse_words.iter().map(|w| w.decode()).collect();
                    let compressed = stage.execute(&pulse)?;
                    for sample in compressed {
                        tx.send(sample).map_err(|_| {
                            StageError::Internal("compression queue consumer closed".into())
                        })?;
                    }
                }
                stage.cleanup();
                Ok(())
            });

            let store = scope.spawn(move || -> StageResult<()> {
                let mut row = vec![CFix::ZERO; range_bins];
                for pulse in 0..pulse_count {
                    for slot in row.iter_mut() {
                        *slot = rx.recv().map_err(|_| {
                            StageError::Internal("compression queue producer closed".into())
                        })?;
                    }
                    matrix_ref.write_row(pulse, &row)?;
                }
                Ok(())
            });

            let compressor_result = join_worker(compressor);
            let store_result = join_worker(store);
            compressor_result.and(store_result)
        })
    }

    fn run_doppler_phase(&self, matrix: &RangePulseMatrix) -> StageResult<Vec<OutputRecord>> {
        let range_bins = self.config.range_bins;
        let pulse_count = self.config.pulse_count;

        thread::scope(|scope| {
            let (fft_in_tx, fft_in_rx) = bounded::<CFix>(pulse_count);
            let (fft_out_tx, fft_out_rx) = bounded::<CFix>(pulse_count);

            let loader = scope.spawn(move || -> StageResult<()> {
                let mut pool = BufferPool::with_capacity(2);
                for range in 0..range_bins {
                    let mut buffer = pool.checkout(pulse_count)?;
                    matrix.copy_column_into(range, &mut buffer)?;
                    for &sample in &buffer {
                        fft_in_tx.send(sample).map_err(|_| {
                            StageError::Internal("Doppler input queue consumer closed".into())
                        })?;
                        self.metrics.record_doppler_input();
                    }
                    pool.release(buffer);
                }
                Ok(())
            });

            let transformer = scope.spawn(move || -> StageResult<()> {
                let mut stage = DopplerStage::new();
                stage.initialize(&self.config)?;
                let mut column = vec![CFix::ZERO; pulse_count];
                for _ in 0..range_bins {
                    for slot in column.iter_mut() {
                        *slot = fft_in_rx.recv().map_err(|_| {
                            StageError::Internal("Doppler input queue producer closed".into())
                        })?;
                    }
                    let spectrum = stage.execute(&column)?;
                    for sample in spectrum {
                        fft_out_tx.send(sample).map_err(|_| {
                            StageError::Internal("Doppler output queue consumer closed".into())
                        })?;
                    }
                }
                stage.cleanup();
                Ok(())
            });

            let writer = scope.spawn(move || -> StageResult<Vec<OutputRecord>> {
                let mut pool = BufferPool::with_capacity(2);
                let mut records = Vec::with_capacity(range_bins * pulse_count);
                for range in 0..range_bins {
                    let mut buffer = pool.checkout(pulse_count)?;
                    for slot in buffer.iter_mut() {
                        *slot = fft_out_rx.recv().map_err(|_| {
                            StageError::Internal("Doppler output queue producer closed".into())
                        })?;
                        self.metrics.record_doppler_output();
                    }
                    for (pulse, &sample) in buffer.iter().enumerate() {
                        let last = range == range_bins - 1 && pulse == pulse_count - 1;
                        records.push(OutputRecord::new(sample, last));
                    }
                    pool.release(buffer);
                }
                Ok(records)
            });

            let loader_result = join_worker(loader);
            let transformer_result = join_worker(transformer);
            let records = join_worker(writer);
            loader_result.and(transformer_result).and(records)
        })
    }
}

fn join_worker<T>(handle: thread::ScopedJoinHandle<'_, StageResult<T>>) -> StageResult<T> {
    handle
        .join()
        .map_err(|_| StageError::Internal("pipeline worker panicked".into()))?
}
