//! # Command Compiler
//!
//! Turns an ordered print job into one byte stream for an emulation.
//!
//! ```text
//! CommandDescriptor ──► PrintCommand ──► Op* ──► bytes
//!     (loose)            (typed)         (IR)    (dialect)
//! ```
//!
//! Compilation never fails. A descriptor without a known operation key, or
//! with an unusable operation value, is skipped with a warning. A bitmap that
//! cannot be decoded or rasterized is dropped with a warning. Either way the
//! rest of the job still compiles.
//!
//! The compiler is stateful across one job only: `appendEncoding` changes the
//! encoding used by every *later* text-bearing descriptor. Each job starts
//! with US-ASCII.
//!
//! ```
//! use cometa::compiler::Compiler;
//! use cometa::emulation::Emulation;
//! use cometa::job::CommandDescriptor;
//!
//! let job = vec![
//!     CommandDescriptor::new().with("append", "Hello\n"),
//!     CommandDescriptor::new().with("appendCutPaper", "FullCutWithFeed"),
//! ];
//! let bytes = Compiler::default().compile(&job, Emulation::StarPrnt);
//! assert_eq!(bytes, b"\x1b@Hello\n\x1bd\x02".to_vec());
//! ```

use std::sync::Arc;

use image::DynamicImage;

use crate::emulation::Emulation;
use crate::encoding::TextEncoding;
use crate::error::CometaError;
use crate::ir::{Op, Program};
use crate::job::{
    BitmapParams, BitmapSource, CommandDescriptor, Payload, Placement, PrintCommand,
};
use crate::options::Alignment;
use crate::render::{bitmap, DefaultImageDecoder, ImageDecoder, Rasterizer, SpleenRasterizer};

/// Mutable state scoped to one compile call.
#[derive(Debug, Default)]
struct CompilerState {
    encoding: TextEncoding,
}

impl CompilerState {
    fn encode(&self, payload: &Payload) -> Vec<u8> {
        payload.encode(&self.encoding)
    }
}

/// Compiles print jobs. Cheap to clone; collaborators are shared.
#[derive(Clone)]
pub struct Compiler {
    decoder: Arc<dyn ImageDecoder>,
    rasterizer: Arc<dyn Rasterizer>,
}

impl Default for Compiler {
    fn default() -> Self {
        Self {
            decoder: Arc::new(DefaultImageDecoder::default()),
            rasterizer: Arc::new(SpleenRasterizer),
        }
    }
}

impl std::fmt::Debug for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiler").finish_non_exhaustive()
    }
}

impl Compiler {
    pub fn new(decoder: Arc<dyn ImageDecoder>, rasterizer: Arc<dyn Rasterizer>) -> Self {
        Self {
            decoder,
            rasterizer,
        }
    }

    pub fn with_decoder(mut self, decoder: impl ImageDecoder + 'static) -> Self {
        self.decoder = Arc::new(decoder);
        self
    }

    pub fn with_rasterizer(mut self, rasterizer: impl Rasterizer + 'static) -> Self {
        self.rasterizer = Arc::new(rasterizer);
        self
    }

    /// Compile `job` to the byte grammar of `emulation`.
    pub fn compile(&self, job: &[CommandDescriptor], emulation: Emulation) -> Vec<u8> {
        let program = self.lower(job);
        let bytes = program.to_bytes(emulation);
        tracing::debug!(
            descriptors = job.len(),
            ops = program.len(),
            bytes = bytes.len(),
            %emulation,
            "compiled print job"
        );
        bytes
    }

    /// Lower `job` to IR without choosing a dialect.
    pub fn lower(&self, job: &[CommandDescriptor]) -> Program {
        let mut state = CompilerState::default();
        let mut program = Program::new();

        for (index, descriptor) in job.iter().enumerate() {
            match PrintCommand::from_descriptor(descriptor) {
                Ok(command) => self.lower_command(index, command, &mut state, &mut program),
                Err(skip) => tracing::warn!(index, reason = %skip, "skipping descriptor"),
            }
        }

        program
    }

    fn lower_command(
        &self,
        index: usize,
        command: PrintCommand,
        state: &mut CompilerState,
        program: &mut Program,
    ) {
        match command {
            PrintCommand::SetEncoding(encoding) => {
                tracing::debug!(index, encoding = encoding.name(), "switching text encoding");
                state.encoding = encoding;
            }
            PrintCommand::CharacterSpace(dots) => program.push(Op::CharacterSpace(dots)),
            PrintCommand::CodePage(page) => program.push(Op::SetCodePage(page)),
            PrintCommand::Append(payload) => program.push(Op::Text(state.encode(&payload))),
            PrintCommand::AppendRaw(payload) => program.push(Op::Raw(state.encode(&payload))),
            PrintCommand::Multiple(payload) => program.extend([
                Op::SetMagnification {
                    height: 2,
                    width: 2,
                },
                Op::Text(state.encode(&payload)),
                Op::SetMagnification {
                    height: 1,
                    width: 1,
                },
            ]),
            PrintCommand::Emphasis(payload) => program.extend([
                Op::SetEmphasis(true),
                Op::Text(state.encode(&payload)),
                Op::SetEmphasis(false),
            ]),
            PrintCommand::EnableEmphasis(on) => program.push(Op::SetEmphasis(on)),
            PrintCommand::Invert(payload) => program.extend([
                Op::SetInvert(true),
                Op::Text(state.encode(&payload)),
                Op::SetInvert(false),
            ]),
            PrintCommand::EnableInvert(on) => program.push(Op::SetInvert(on)),
            PrintCommand::Underline(payload) => program.extend([
                Op::SetUnderline(true),
                Op::Text(state.encode(&payload)),
                Op::SetUnderline(false),
            ]),
            PrintCommand::EnableUnderline(on) => program.push(Op::SetUnderline(on)),
            PrintCommand::International(set) => program.push(Op::SetInternational(set)),
            PrintCommand::LineFeed(lines) => program.push(Op::LineFeed(lines)),
            PrintCommand::UnitFeed(dots) => program.push(Op::UnitFeed(dots)),
            PrintCommand::LineSpace(dots) => program.push(Op::SetLineSpace(dots)),
            PrintCommand::FontStyle(style) => program.push(Op::SetFont(style)),
            PrintCommand::CutPaper(action) => program.push(Op::Cut(action)),
            PrintCommand::OpenCashDrawer(channel) => program.push(Op::Peripheral(channel)),
            PrintCommand::BlackMark(mode) => program.push(Op::SetBlackMark(mode)),
            PrintCommand::AbsolutePosition { position, data } => {
                program.push(Op::AbsolutePosition(position));
                if let Some(data) = data {
                    program.push(Op::Text(state.encode(&data)));
                }
            }
            PrintCommand::Alignment { alignment, data } => match data {
                Some(data) => place(
                    program,
                    Placement::Aligned(alignment),
                    Op::Text(state.encode(&data)),
                ),
                None => program.push(Op::SetAlign(alignment)),
            },
            PrintCommand::HorizontalTabPosition(stops) => program.push(Op::TabStops(stops)),
            PrintCommand::Logo { key, size } => program.push(Op::Logo { key, size }),
            PrintCommand::Barcode {
                data,
                symbology,
                width,
                height,
                hri,
                placement,
            } => {
                let barcode = Op::Barcode {
                    symbology,
                    width,
                    height,
                    hri,
                    data: state.encode(&data),
                };
                place(program, placement, barcode);
            }
            PrintCommand::Bitmap {
                source,
                params,
                placement,
            } => match self.render_bitmap(&source, &params) {
                Ok(raster) => place(program, placement, raster),
                Err(e) => tracing::warn!(index, error = %e, "dropping bitmap descriptor"),
            },
        }
    }

    fn render_bitmap(&self, source: &BitmapSource, params: &BitmapParams) -> Result<Op, CometaError> {
        let image: DynamicImage = match source {
            BitmapSource::Uri(uri) => self.decoder.decode_uri(uri)?,
            BitmapSource::Bytes(bytes) => self.decoder.decode_bytes(bytes)?,
            BitmapSource::Text { text, font_size } => {
                self.rasterizer.rasterize(text, *font_size, params.width)?
            }
        };
        let mono = bitmap::convert(&image, params)?;
        Ok(Op::Raster {
            width: mono.width,
            height: mono.height,
            data: mono.data,
        })
    }
}

/// Emit `element` with its placement.
///
/// Absolute placement moves the print position first. Aligned placement
/// sets the alignment, emits the element and restores left alignment.
fn place(program: &mut Program, placement: Placement, element: Op) {
    match placement {
        Placement::Inline => program.push(element),
        Placement::Absolute(position) => {
            program.extend([Op::AbsolutePosition(position), element]);
        }
        Placement::Aligned(alignment) => {
            program.extend([
                Op::SetAlign(alignment),
                element,
                Op::SetAlign(Alignment::Left),
            ]);
        }
    }
}

/// Compile with the default decoder and rasterizer.
pub fn compile(job: &[CommandDescriptor], emulation: Emulation) -> Vec<u8> {
    Compiler::default().compile(job, emulation)
}
