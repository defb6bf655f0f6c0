use crate::{
    Effect, ImageFilterResult,
    adjustment::{Adjustment, EditPreset},
    buffer::{CHANNELS, PixelBuffer},
    filter::FilterKind,
};
use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Renders `filter` then `adjustment` from the untouched `source` into a new
/// buffer. Same inputs always give byte-identical output.
pub fn composite(source: &PixelBuffer, filter: FilterKind, adjustment: Adjustment) -> PixelBuffer {
    let start = Instant::now();

    let output = if adjustment.is_identity() {
        match filter {
            FilterKind::Identity => source.clone(),
            _ => filter.apply(source),
        }
    } else {
        render_with(source, |rgb| adjustment.apply_pixel(filter.apply_pixel(rgb)))
    };

    log::debug!(
        "composited {}x{} filter={} brightness={} saturation={} in {:.2?}",
        source.width(),
        source.height(),
        filter,
        adjustment.brightness(),
        adjustment.saturation(),
        start.elapsed()
    );

    output
}

/// Applies `map` to the RGB of every pixel of `source`, writing into a freshly
/// allocated buffer. Alpha is copied through.
pub(crate) fn render_with<F>(source: &PixelBuffer, map: F) -> PixelBuffer
where
    F: Fn([u8; 3]) -> [u8; 3] + Sync,
{
    let src = source.as_raw();
    let mut pixels = vec![0u8; src.len()];

    let write = |(dst, src): (&mut [u8], &[u8])| {
        let [r, g, b] = map([src[0], src[1], src[2]]);
        dst[0] = r;
        dst[1] = g;
        dst[2] = b;
        dst[3] = src[3];
    };

    #[cfg(feature = "parallel")]
    pixels
        .par_chunks_exact_mut(CHANNELS)
        .zip(src.par_chunks_exact(CHANNELS))
        .for_each(write);

    #[cfg(not(feature = "parallel"))]
    pixels
        .chunks_exact_mut(CHANNELS)
        .zip(src.chunks_exact(CHANNELS))
        .for_each(write);

    PixelBuffer::from_parts(source.width(), source.height(), pixels)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositorState {
    /// Output is the filtered source, no sliders applied
    Clean,
    /// Output is filter plus adjustment
    Adjusted,
}

/// Holds the loaded source and the active edit, and owns the last rendered
/// output. Every operation re-renders from the source, never from a previous
/// output.
#[derive(Debug, Clone)]
pub struct Compositor {
    source: Arc<PixelBuffer>,
    filter: FilterKind,
    adjustment: Adjustment,
    output: Arc<PixelBuffer>,
}

impl Compositor {
    pub fn new(source: PixelBuffer) -> Self {
        let source = Arc::new(source);
        Self {
            output: source.clone(),
            source,
            filter: FilterKind::Identity,
            adjustment: Adjustment::default(),
        }
    }

    /// Validates raw RGBA bytes and builds a compositor over them.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> ImageFilterResult<Self> {
        Ok(Self::new(PixelBuffer::new(width, height, data)?))
    }

    /// Replaces the source and returns to Identity with zeroed sliders.
    pub fn load_source(&mut self, source: PixelBuffer) {
        log::info!("loaded {}x{} source", source.width(), source.height());
        *self = Self::new(source);
    }

    /// Like [`Compositor::load_source`] but from raw bytes. On a length
    /// mismatch the current state is kept.
    pub fn load_raw(&mut self, width: u32, height: u32, data: Vec<u8>) -> ImageFilterResult<()> {
        let source = PixelBuffer::new(width, height, data)?;
        self.load_source(source);
        Ok(())
    }

    pub fn set_filter(&mut self, filter: FilterKind) -> Arc<PixelBuffer> {
        self.filter = filter;
        self.render()
    }

    pub fn set_filter_by_name(&mut self, name: &str) -> ImageFilterResult<Arc<PixelBuffer>> {
        let filter = name.parse()?;
        Ok(self.set_filter(filter))
    }

    pub fn set_filter_by_id(&mut self, id: u8) -> ImageFilterResult<Arc<PixelBuffer>> {
        let filter = FilterKind::from_id(id)?;
        Ok(self.set_filter(filter))
    }

    /// Out-of-range values are clamped to `[-100, 100]`.
    pub fn set_adjustment(&mut self, brightness: i32, saturation: i32) -> Arc<PixelBuffer> {
        self.apply_adjustment(Adjustment::new(brightness, saturation))
    }

    pub fn apply_adjustment(&mut self, adjustment: Adjustment) -> Arc<PixelBuffer> {
        self.adjustment = adjustment;
        self.render()
    }

    pub fn apply_preset(&mut self, preset: EditPreset) -> Arc<PixelBuffer> {
        self.filter = preset.filter;
        self.adjustment = preset.adjustment;
        self.render()
    }

    /// Back to Identity with zeroed sliders; the output is the source itself.
    pub fn reset(&mut self) -> Arc<PixelBuffer> {
        log::info!("reset to original");
        self.filter = FilterKind::Identity;
        self.adjustment = Adjustment::default();
        self.output = self.source.clone();
        self.output.clone()
    }

    pub fn export_buffer(&self) -> Arc<PixelBuffer> {
        self.output.clone()
    }

    pub fn source(&self) -> &PixelBuffer {
        &self.source
    }

    pub fn filter(&self) -> FilterKind {
        self.filter
    }

    pub fn adjustment(&self) -> Adjustment {
        self.adjustment
    }

    pub fn preset(&self) -> EditPreset {
        EditPreset::new()
            .with_filter(self.filter)
            .with_adjustment(self.adjustment)
    }

    pub fn state(&self) -> CompositorState {
        if self.adjustment.is_identity() {
            CompositorState::Clean
        } else {
            CompositorState::Adjusted
        }
    }

    fn render(&mut self) -> Arc<PixelBuffer> {
        self.output = Arc::new(composite(&self.source, self.filter, self.adjustment));
        self.output.clone()
    }
}

/// Thread-safe front end over [`Compositor`] state.
///
/// Rendering runs outside the lock. Each request takes a generation number
/// and its output is only committed if no newer request was issued while it
/// rendered, so a slow stale render never replaces a newer result. The
/// visible filter, adjustment and output change together at commit; pending
/// edits are tracked separately so concurrent requests build on each other.
#[derive(Debug, Clone)]
pub struct SharedCompositor {
    inner: Arc<Mutex<SharedState>>,
}

#[derive(Debug)]
struct SharedState {
    compositor: Compositor,
    pending: EditPreset,
    generation: u64,
}

struct RenderTicket {
    generation: u64,
    source: Arc<PixelBuffer>,
    preset: EditPreset,
}

impl RenderTicket {
    fn render(&self) -> Arc<PixelBuffer> {
        Arc::new(composite(
            &self.source,
            self.preset.filter,
            self.preset.adjustment,
        ))
    }
}

impl SharedCompositor {
    pub fn new(source: PixelBuffer) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SharedState {
                compositor: Compositor::new(source),
                pending: EditPreset::default(),
                generation: 0,
            })),
        }
    }

    pub fn load_source(&self, source: PixelBuffer) {
        let mut state = self.lock();
        state.generation += 1;
        state.pending = EditPreset::default();
        state.compositor.load_source(source);
    }

    pub fn set_filter(&self, filter: FilterKind) -> Arc<PixelBuffer> {
        self.update(|preset| preset.with_filter(filter))
    }

    pub fn set_filter_by_name(&self, name: &str) -> ImageFilterResult<Arc<PixelBuffer>> {
        let filter = name.parse()?;
        Ok(self.set_filter(filter))
    }

    pub fn set_adjustment(&self, brightness: i32, saturation: i32) -> Arc<PixelBuffer> {
        let adjustment = Adjustment::new(brightness, saturation);
        self.update(|preset| preset.with_adjustment(adjustment))
    }

    pub fn reset(&self) -> Arc<PixelBuffer> {
        let mut state = self.lock();
        state.generation += 1;
        state.pending = EditPreset::default();
        state.compositor.reset()
    }

    pub fn export_buffer(&self) -> Arc<PixelBuffer> {
        self.lock().compositor.export_buffer()
    }

    pub fn preset(&self) -> EditPreset {
        self.lock().compositor.preset()
    }

    pub fn state(&self) -> CompositorState {
        self.lock().compositor.state()
    }

    /// Queues the new edit, renders it unlocked, then commits if still latest.
    fn update(&self, edit: impl FnOnce(EditPreset) -> EditPreset) -> Arc<PixelBuffer> {
        let ticket = self.begin(edit);
        let output = ticket.render();
        self.commit(&ticket, output.clone());
        output
    }

    fn begin(&self, edit: impl FnOnce(EditPreset) -> EditPreset) -> RenderTicket {
        let mut state = self.lock();
        state.generation += 1;

        let preset = edit(state.pending);
        state.pending = preset;

        RenderTicket {
            generation: state.generation,
            source: state.compositor.source.clone(),
            preset,
        }
    }

    fn commit(&self, ticket: &RenderTicket, output: Arc<PixelBuffer>) -> bool {
        let mut state = self.lock();
        if state.generation != ticket.generation {
            log::debug!(
                "dropped stale render #{}, latest is #{}",
                ticket.generation,
                state.generation
            );
            return false;
        }

        let compositor = &mut state.compositor;
        compositor.filter = ticket.preset.filter;
        compositor.adjustment = ticket.preset.adjustment;
        compositor.output = output;
        true
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        // A panic mid-update leaves no partial buffer behind, so a poisoned lock is still usable.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
