use crate::merge::DEFAULT_SEGMENT_LEN;
use crate::PvarEngine;

pub struct PvarEngineBuilder<'a> {
    x: &'a [f64],
    p: f64,
    segment_len: Option<usize>,
}

impl<'a> PvarEngineBuilder<'a> {
    pub fn new(x: &'a [f64], p: f64) -> Self {
        Self {
            x,
            p,
            segment_len: None,
        }
    }
    pub fn with_segment_len(mut self, segment_len: usize) -> Self {
        self.segment_len = Some(segment_len);
        self
    }
    pub fn build(self) -> PvarEngine<'a> {
        match self.segment_len {
            Some(s) => PvarEngine::with_segment_len(self.x, self.p, s),
            None => PvarEngine::with_segment_len(self.x, self.p, DEFAULT_SEGMENT_LEN),
        }
    }
}
