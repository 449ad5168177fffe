/// Values this close to zero are flushed so long silent tails never reach denormals.
const DENORMAL_THRESHOLD: f32 = 1.0e-20;

#[inline(always)]
fn flush_denormal(value: f32) -> f32 {
    if value.abs() < DENORMAL_THRESHOLD {
        0.0
    } else {
        value
    }
}

/// Feedback comb filter with a one-pole lowpass in the loop.
pub(crate) struct CombFilter {
    buffer: Vec<f32>,
    index: usize,
    feedback: f32,
    filter_store: f32,
    damp1: f32,
    damp2: f32,
}

impl CombFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            index: 0,
            feedback: 0.0,
            filter_store: 0.0,
            damp1: 0.0,
            damp2: 1.0,
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback;
    }

    pub fn set_damp(&mut self, damp: f32) {
        self.damp1 = damp;
        self.damp2 = 1.0 - damp;
    }

    #[inline(always)]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.buffer[self.index];
        self.filter_store = flush_denormal(output * self.damp2 + self.filter_store * self.damp1);
        self.buffer[self.index] = flush_denormal(input + self.filter_store * self.feedback);
        self.index = (self.index + 1) % self.buffer.len();
        output
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.filter_store = 0.0;
        self.index = 0;
    }
}

/// Schroeder allpass diffuser.
pub(crate) struct AllpassFilter {
    buffer: Vec<f32>,
    index: usize,
    feedback: f32,
}

impl AllpassFilter {
    pub fn new(delay_samples: usize, feedback: f32) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            index: 0,
            feedback,
        }
    }

    #[inline(always)]
    pub fn process(&mut self, input: f32) -> f32 {
        let buffered = self.buffer[self.index];
        let output = buffered - input;
        self.buffer[self.index] = flush_denormal(input + buffered * self.feedback);
        self.index = (self.index + 1) % self.buffer.len();
        output
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comb_filter_delays_input() {
        let delay_samples = 100;
        let mut comb = CombFilter::new(delay_samples);
        comb.set_feedback(0.5);
        comb.set_damp(0.0);

        // The first pass through the delay line reads the zero-initialized buffer
        assert_eq!(comb.process(1.0), 0.0);
        for _ in 1..delay_samples {
            assert_eq!(comb.process(0.0), 0.0);
        }

        // The impulse comes back after one full delay
        assert!((comb.process(0.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_comb_filter_feedback_decays() {
        let delay_samples = 10;
        let mut comb = CombFilter::new(delay_samples);
        comb.set_feedback(0.5);
        comb.set_damp(0.0);

        comb.process(1.0);
        let mut echoes = Vec::new();
        for i in 1..(delay_samples * 4) {
            let output = comb.process(0.0);
            if i % delay_samples == 0 {
                echoes.push(output);
            }
        }

        assert_eq!(echoes.len(), 3);
        assert!((echoes[0] - 1.0).abs() < 1e-6);
        assert!((echoes[1] - 0.5).abs() < 1e-6);
        assert!((echoes[2] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_allpass_filter_response() {
        let delay_samples = 50;
        let mut allpass = AllpassFilter::new(delay_samples, 0.5);

        // While the buffer is still empty the output is the negated input
        for _ in 0..delay_samples {
            assert!((allpass.process(1.0) + 1.0).abs() < 1e-6);
        }

        // After one cycle the stored 1.0 cancels the input
        assert!(allpass.process(1.0).abs() < 1e-6);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut comb = CombFilter::new(4);
        comb.set_feedback(0.9);
        let mut allpass = AllpassFilter::new(4, 0.5);
        for _ in 0..16 {
            comb.process(1.0);
            allpass.process(1.0);
        }

        comb.reset();
        allpass.reset();
        for _ in 0..8 {
            assert_eq!(comb.process(0.0), 0.0);
            assert_eq!(allpass.process(0.0), 0.0);
        }
    }
}
