use ndarray::Array2;

use crate::math::fixed::CFix;
use crate::prelude::{StageError, StageResult};

/// Range-pulse accumulation store: `pulse_count` rows by `range_bins`
/// columns, written row-at-a-time by the compression phase and read
/// column-at-a-time by the Doppler phase.
///
/// The store is addressable memory rather than a queue: the writing phase
/// runs to completion before the reading phase starts, so a bounded FIFO in
/// its place would need to hold the entire matrix to stay live.
pub struct RangePulseMatrix {
    cells: Array2<CFix>,
    row_written: Vec<bool>,
    rows_complete: usize,
    sealed: bool,
}

impl RangePulseMatrix {
    pub fn new(pulse_count: usize, range_bins: usize) -> Self {
        Self {
            cells: Array2::from_elem((pulse_count, range_bins), CFix::ZERO),
            row_written: vec![false; pulse_count],
            rows_complete: 0,
            sealed: false,
        }
    }

    pub fn pulse_count(&self) -> usize {
        self.cells.nrows()
    }

    pub fn range_bins(&self) -> usize {
        self.cells.ncols()
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Stores one compressed pulse as a whole row, exactly once per pulse.
    pub fn write_row(&mut self, pulse: usize, row: &[CFix]) -> StageResult<()> {
        if self.sealed {
            return Err(StageError::PhaseOrder(
                "write_row after the store was sealed".into(),
            ));
        }
        if pulse >= self.pulse_count() {
            return Err(StageError::InvalidInput(format!(
                "pulse index {} out of range 0..{}",
                pulse,
                self.pulse_count()
            )));
        }
        if row.len() != self.range_bins() {
            return Err(StageError::InvalidInput(format!(
                "row needs {} samples, got {}",
                self.range_bins(),
                row.len()
            )));
        }
        if self.row_written[pulse] {
            return Err(StageError::PhaseOrder(format!(
                "pulse {} written twice",
                pulse
            )));
        }

        for (cell, &sample) in self.cells.row_mut(pulse).iter_mut().zip(row) {
            *cell = sample;
        }
        self.row_written[pulse] = true;
        self.rows_complete += 1;
        Ok(())
    }

    /// The all-rows-written barrier between the two phases.
    pub fn seal(&mut self) -> StageResult<()> {
        if self.rows_complete != self.pulse_count() {
            return Err(StageError::PhaseOrder(format!(
                "seal with {}/{} rows written",
                self.rows_complete,
                self.pulse_count()
            )));
        }
        self.sealed = true;
        Ok(())
    }

    /// Reads one range bin across all pulses. Only legal once sealed.
    pub fn read_column(&self, range: usize) -> StageResult<Vec<CFix>> {
        let mut column = vec![CFix::ZERO; self.pulse_count()];
        self.copy_column_into(range, &mut column)?;
        Ok(column)
    }

    /// Streaming form of `read_column` that fills a caller-owned buffer.
    pub fn copy_column_into(&self, range: usize, buffer: &mut [CFix]) -> StageResult<()> {
        if !self.sealed {
            return Err(StageError::PhaseOrder(
                "read_column before the store was sealed".into(),
            ));
        }
        if range >= self.range_bins() {
            return Err(StageError::InvalidInput(format!(
                "range index {} out of range 0..{}",
                range,
                self.range_bins()
            )));
        }
        if buffer.len() != self.pulse_count() {
            return Err(StageError::InvalidInput(format!(
                "column buffer needs {} samples, got {}",
                self.pulse_count(),
                buffer.len()
            )));
        }

        for (slot, &cell) in buffer.iter_mut().zip(self.cells.column(range)) {
            *slot = cell;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::fixed::Fx;

    fn row_of(value: i16, len: usize) -> Vec<CFix> {
        vec![CFix::new(Fx::from_raw(value), Fx::ZERO); len]
    }

    #[test]
    fn column_read_sees_row_major_writes() {
        let mut matrix = RangePulseMatrix::new(3, 4);
        for pulse in 0..3 {
            matrix.write_row(pulse, &row_of(pulse as i16 + 1, 4)).unwrap();
        }
        matrix.seal().unwrap();

        let column = matrix.read_column(2).unwrap();
        let values: Vec<i16> = column.iter().map(|s| s.re.raw()).collect();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn read_before_seal_is_a_phase_violation() {
        let mut matrix = RangePulseMatrix::new(2, 4);
        matrix.write_row(0, &row_of(1, 4)).unwrap();
        let err = matrix.read_column(0).unwrap_err();
        assert!(matches!(err, StageError::PhaseOrder(_)));
    }

    #[test]
    fn seal_requires_every_row() {
        let mut matrix = RangePulseMatrix::new(2, 4);
        matrix.write_row(1, &row_of(1, 4)).unwrap();
        assert!(matches!(
            matrix.seal().unwrap_err(),
            StageError::PhaseOrder(_)
        ));
    }

    #[test]
    fn double_write_and_post_seal_write_are_rejected() {
        let mut matrix = RangePulseMatrix::new(2, 4);
        matrix.write_row(0, &row_of(1, 4)).unwrap();
        assert!(matrix.write_row(0, &row_of(2, 4)).is_err());

        matrix.write_row(1, &row_of(3, 4)).unwrap();
        matrix.seal().unwrap();
        assert!(matrix.write_row(1, &row_of(4, 4)).is_err());
    }

    #[test]
    fn wrong_row_length_is_rejected() {
        let mut matrix = RangePulseMatrix::new(2, 4);
        assert!(matrix.write_row(0, &row_of(1, 3)).is_err());
    }
}
