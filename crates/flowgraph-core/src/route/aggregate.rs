//! Per-cycle aggregation of bound outlets into an inlet.
//!
//! Scalar and block inlets start from silence and add every outlet whose voice
//! is active, once per declaration that bound its bucket; the loop performs no
//! validation and cannot fail. Frame inlets
//! merge instead of summing and validate the source format once, on first use.
//!
//! Outlets of retired voices are skipped, never unbound. That check is the only
//! mechanism by which a finished voice leaves a mix.

use crate::error::RouteError;
use crate::frame::{Frame, merge_dominant};

use super::port::{Block, Inlet};

/// Merge progress of a frame inlet.
#[derive(Debug, Default)]
pub struct FrameMergeState {
    initialized: bool,
    last_merged: u64,
}

impl Inlet<f64> {
    /// Sums the values of all active bound outlets.
    ///
    /// Returns `0.0` when nothing is bound or nothing is active.
    pub fn aggregate(&self) -> f64 {
        let mut sum = 0.0;
        for binding in &self.bindings {
            let weight = f64::from(binding.declarations());
            for outlet in binding.bucket().outlets().iter() {
                if outlet.is_active() {
                    sum += outlet.value() * weight;
                }
            }
        }
        sum
    }
}

impl Inlet<Block> {
    /// Zeroes `sink` and adds every active bound outlet into it element-wise.
    ///
    /// Sources shorter than `sink` contribute to their own length only.
    pub fn aggregate(&self, sink: &mut [f64]) {
        sink.fill(0.0);
        for binding in &self.bindings {
            let weight = f64::from(binding.declarations());
            for outlet in binding.bucket().outlets().iter() {
                if !outlet.is_active() {
                    continue;
                }
                let block = outlet.read();
                for (dst, src) in sink.iter_mut().zip(block.iter()) {
                    *dst += *src * weight;
                }
            }
        }
    }

    /// Convenience wrapper that allocates a `len`-sample sink.
    pub fn aggregate_to_vec(&self, len: usize) -> Block {
        let mut sink = vec![0.0; len];
        self.aggregate(&mut sink);
        sink
    }
}

impl Inlet<Frame> {
    /// Merges active bound frames into `sink`.
    ///
    /// Merging is idempotent, so repeated declarations of one source have no
    /// extra effect here.
    ///
    /// On the first active source ever seen, `sink` adopts that source's
    /// analysis format; a format other than amp-freq or amp-phase is rejected
    /// and the adoption is retried on the next call.
    ///
    /// Standard frames are merged only when a source's generation is newer
    /// than the last merged one. The first such source in a call starts a new
    /// sink frame; later ones merge into it by magnitude dominance, ties keeping
    /// the earlier source. Sliding frames are rebuilt every call.
    pub fn aggregate(&self, sink: &mut Frame) -> Result<(), RouteError> {
        let mut state = self.state.lock();
        let last_merged = state.last_merged;
        let mut newest: Option<u64> = None;

        if state.initialized && sink.is_sliding() {
            sink.clear_bins();
        }

        for binding in &self.bindings {
            for outlet in binding.bucket().outlets().iter() {
                if !outlet.is_active() {
                    continue;
                }
                let source = outlet.read();

                if !state.initialized {
                    #[cfg(feature = "tracing")]
                    if std::sync::Arc::ptr_eq(outlet.voice(), self.voice()) {
                        tracing::warn!(
                            "inlet {}: frame source {} belongs to the same voice",
                            self.id(),
                            outlet.id()
                        );
                    }
                    sink.adopt_format(&source);
                    if !sink.format.is_mergeable() {
                        return Err(RouteError::UnsupportedFrameFormat {
                            inlet: self.id().clone(),
                            format: sink.format,
                        });
                    }
                    state.initialized = true;
                    state.last_merged = 0;
                }

                if sink.is_sliding() {
                    merge_dominant(&mut sink.bins, &source.bins);
                    continue;
                }

                if source.frame_count <= last_merged {
                    continue;
                }
                if newest.is_none() {
                    sink.clear_bins();
                }
                merge_dominant(&mut sink.bins, &source.bins);
                newest = Some(newest.map_or(source.frame_count, |n| n.max(source.frame_count)));
            }
        }

        if let Some(generation) = newest {
            state.last_merged = generation;
            sink.frame_count = generation;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::frame::FrameFormat;
    use crate::route::{Bucket, Outlet, PortId};
    use crate::voice::{InstrumentTemplate, Voice, VoiceId};

    fn voice(id: u64) -> Arc<Voice> {
        Arc::new(Voice::new(VoiceId(id), InstrumentTemplate::named(1, "Src")))
    }

    fn sink_voice() -> Arc<Voice> {
        Arc::new(Voice::new(VoiceId(99), InstrumentTemplate::named(2, "Sink")))
    }

    fn bound<S: crate::route::PortSignal>(
        outlets: &[Arc<Outlet<S>>],
    ) -> Inlet<S> {
        let bucket = Bucket::new();
        for outlet in outlets {
            bucket.insert(Arc::clone(outlet));
        }
        let mut inlet = Inlet::new(PortId::new("Sink", "in"), sink_voice());
        inlet.bind(bucket);
        inlet
    }

    #[test]
    fn unbound_scalar_is_zero() {
        let inlet = Inlet::<f64>::new(PortId::new("Sink", "in"), sink_voice());
        assert_eq!(inlet.aggregate(), 0.0);
    }

    #[test]
    fn scalar_sums_active_only() {
        let a = Arc::new(Outlet::new(PortId::new("Src", "out"), voice(1)));
        let b = Arc::new(Outlet::new(PortId::new("Src", "out"), voice(2)));
        a.set(2.0);
        b.set(3.0);
        let inlet = bound(&[Arc::clone(&a), Arc::clone(&b)]);
        assert_eq!(inlet.aggregate(), 5.0);

        b.voice().set_active(false);
        assert_eq!(inlet.aggregate(), 2.0);
    }

    #[test]
    fn block_resets_before_summing() {
        let a = Arc::new(Outlet::<Block>::new(PortId::new("Src", "out"), voice(1)));
        a.write_block(&[1.0, 2.0, 3.0, 4.0]);
        let inlet = bound(&[Arc::clone(&a)]);

        let mut sink = vec![9.0; 4];
        inlet.aggregate(&mut sink);
        assert_eq!(sink, vec![1.0, 2.0, 3.0, 4.0]);
        inlet.aggregate(&mut sink);
        assert_eq!(sink, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn short_source_block_adds_prefix_only() {
        let a = Arc::new(Outlet::<Block>::new(PortId::new("Src", "out"), voice(1)));
        a.write_block(&[1.0, 1.0]);
        let inlet = bound(&[a]);
        assert_eq!(inlet.aggregate_to_vec(4), vec![1.0, 1.0, 0.0, 0.0]);
    }

    fn frame(count: u64, bins: &[f32]) -> Frame {
        let mut f = Frame::new(bins.len() - 2, FrameFormat::AmpFreq);
        f.bins.copy_from_slice(bins);
        f.frame_count = count;
        f
    }

    #[test]
    fn frame_merge_takes_dominant_bins() {
        let a = Arc::new(Outlet::<Frame>::new(PortId::new("Src", "f"), voice(1)));
        let b = Arc::new(Outlet::<Frame>::new(PortId::new("Src", "f"), voice(2)));
        a.write(frame(1, &[1.0, 100.0, 5.0, 200.0]));
        b.write(frame(1, &[2.0, 110.0, 4.0, 210.0]));
        let inlet = bound(&[a, b]);

        let mut sink = Frame::default();
        inlet.aggregate(&mut sink).unwrap();
        assert_eq!(sink.bins, vec![2.0, 110.0, 5.0, 200.0]);
        assert_eq!(sink.frame_count, 1);
        assert_eq!(sink.size, 2);
    }

    #[test]
    fn stale_generation_is_skipped() {
        let a = Arc::new(Outlet::<Frame>::new(PortId::new("Src", "f"), voice(1)));
        a.write(frame(1, &[1.0, 100.0, 1.0, 100.0]));
        let inlet = bound(&[Arc::clone(&a)]);

        let mut sink = Frame::default();
        inlet.aggregate(&mut sink).unwrap();
        sink.bins[0] = 42.0;
        inlet.aggregate(&mut sink).unwrap();
        assert_eq!(sink.bins[0], 42.0, "same generation must not re-merge");

        a.write(frame(2, &[0.5, 50.0, 0.5, 50.0]));
        inlet.aggregate(&mut sink).unwrap();
        assert_eq!(sink.bins, vec![0.5, 50.0, 0.5, 50.0]);
        assert_eq!(sink.frame_count, 2);
    }

    #[test]
    fn unsupported_format_is_an_error() {
        let a = Arc::new(Outlet::<Frame>::new(PortId::new("Src", "f"), voice(1)));
        let mut f = frame(1, &[1.0, 0.0, 1.0, 0.0]);
        f.format = FrameFormat::Complex;
        a.write(f);
        let inlet = bound(&[a]);

        let mut sink = Frame::default();
        let err = inlet.aggregate(&mut sink).unwrap_err();
        assert!(matches!(
            err,
            RouteError::UnsupportedFrameFormat {
                format: FrameFormat::Complex,
                ..
            }
        ));
    }

    #[test]
    fn inactive_frames_leave_sink_untouched() {
        let a = Arc::new(Outlet::<Frame>::new(PortId::new("Src", "f"), voice(1)));
        a.write(frame(1, &[1.0, 0.0, 1.0, 0.0]));
        a.voice().set_active(false);
        let inlet = bound(&[a]);

        let mut sink = Frame::default();
        inlet.aggregate(&mut sink).unwrap();
        assert!(sink.bins.is_empty());
        assert_eq!(sink.frame_count, 0);
    }

    #[test]
    fn sliding_frames_merge_per_bin() {
        let a = Arc::new(Outlet::<Frame>::new(PortId::new("Src", "f"), voice(1)));
        let b = Arc::new(Outlet::<Frame>::new(PortId::new("Src", "f"), voice(2)));
        let mut fa = Frame::sliding(4, 1, 2, FrameFormat::AmpFreq);
        fa.bins.copy_from_slice(&[1.0, 0.1, 3.0, 0.3]);
        let mut fb = Frame::sliding(4, 1, 2, FrameFormat::AmpFreq);
        fb.bins.copy_from_slice(&[2.0, 0.2, 1.0, 0.1]);
        a.write(fa);
        b.write(fb);
        let inlet = bound(&[a, b]);

        let mut sink = Frame::default();
        inlet.aggregate(&mut sink).unwrap();
        assert_eq!(sink.bins, vec![2.0, 0.2, 3.0, 0.3]);
    }

    #[test]
    fn only_advanced_sources_merge_and_newest_generation_wins() {
        let a = Arc::new(Outlet::<Frame>::new(PortId::new("Src", "f"), voice(1)));
        let b = Arc::new(Outlet::<Frame>::new(PortId::new("Src", "f"), voice(2)));
        a.write(frame(4, &[1.0, 10.0, 1.0, 10.0]));
        b.write(frame(4, &[1.0, 10.0, 1.0, 10.0]));
        let inlet = bound(&[Arc::clone(&a), Arc::clone(&b)]);

        let mut sink = Frame::default();
        inlet.aggregate(&mut sink).unwrap();
        assert_eq!(sink.frame_count, 4);

        // a regresses to 3, b advances to 5: only b contributes.
        a.write(frame(3, &[9.0, 90.0, 9.0, 90.0]));
        b.write(frame(5, &[2.0, 20.0, 0.5, 5.0]));
        inlet.aggregate(&mut sink).unwrap();
        assert_eq!(sink.bins, vec![2.0, 20.0, 0.5, 5.0]);
        assert_eq!(sink.frame_count, 5);

        // Both advance; the sink restarts from the first and keeps the highest generation.
        a.write(frame(7, &[1.0, 11.0, 3.0, 33.0]));
        b.write(frame(6, &[2.0, 22.0, 1.0, 1.0]));
        inlet.aggregate(&mut sink).unwrap();
        assert_eq!(sink.bins, vec![2.0, 22.0, 3.0, 33.0]);
        assert_eq!(sink.frame_count, 7);

        // Nothing newer than 7: sink untouched.
        a.write(frame(7, &[100.0, 1.0, 100.0, 1.0]));
        inlet.aggregate(&mut sink).unwrap();
        assert_eq!(sink.bins, vec![2.0, 22.0, 3.0, 33.0]);
        assert_eq!(sink.frame_count, 7);
    }

    #[test]
    fn sliding_sink_is_rebuilt_every_cycle() {
        let a = Arc::new(Outlet::<Frame>::new(PortId::new("Src", "f"), voice(1)));
        let mut loud = Frame::sliding(4, 1, 2, FrameFormat::AmpFreq);
        loud.bins.copy_from_slice(&[1.0, 0.1, 3.0, 0.3]);
        a.write(loud);
        let inlet = bound(&[Arc::clone(&a)]);

        let mut sink = Frame::default();
        inlet.aggregate(&mut sink).unwrap();
        assert_eq!(sink.bins, vec![1.0, 0.1, 3.0, 0.3]);

        let mut quiet = Frame::sliding(4, 1, 2, FrameFormat::AmpFreq);
        quiet.bins.copy_from_slice(&[0.5, 0.05, 0.25, 0.025]);
        a.write(quiet);
        inlet.aggregate(&mut sink).unwrap();
        assert_eq!(sink.bins, vec![0.5, 0.05, 0.25, 0.025]);
    }

    #[test]
    fn rejected_format_is_adopted_again_next_cycle() {
        let a = Arc::new(Outlet::<Frame>::new(PortId::new("Src", "f"), voice(1)));
        let mut complex = frame(1, &[1.0, 0.0, 1.0, 0.0]);
        complex.format = FrameFormat::Complex;
        a.write(complex);
        let inlet = bound(&[Arc::clone(&a)]);

        let mut sink = Frame::default();
        assert!(inlet.aggregate(&mut sink).is_err());

        let mut phase = frame(1, &[1.0, 10.0, 2.0, 20.0]);
        phase.format = FrameFormat::AmpPhase;
        a.write(phase);
        inlet.aggregate(&mut sink).unwrap();
        assert_eq!(sink.format, FrameFormat::AmpPhase);
        assert_eq!(sink.bins, vec![1.0, 10.0, 2.0, 20.0]);
        assert_eq!(sink.frame_count, 1);
    }

    #[test]
    fn self_fed_frame_inlet_still_merges() {
        // With `tracing` enabled this logs a feedback warning on adoption.
        let own = sink_voice();
        let outlet = Arc::new(Outlet::<Frame>::new(PortId::new("Sink", "f"), Arc::clone(&own)));
        outlet.write(frame(1, &[4.0, 40.0, 5.0, 50.0]));
        let bucket = Bucket::new();
        bucket.insert(Arc::clone(&outlet));
        let mut inlet = Inlet::new(PortId::new("Sink", "in"), Arc::clone(&own));
        inlet.bind(bucket);
        assert!(Arc::ptr_eq(outlet.voice(), inlet.voice()));

        let mut sink = Frame::default();
        inlet.aggregate(&mut sink).unwrap();
        assert_eq!(sink.bins, vec![4.0, 40.0, 5.0, 50.0]);
        assert_eq!(sink.frame_count, 1);
    }
}
