//! Centralized limits and thresholds for the data-flow engine.
//!
//! # Categories
//!
//! - **Derivation**: pass caps for the worklist fixpoint
//! - **Program points**: the encoding of line/column pairs into a single ordinal
//! - **Arrays**: how far a write may extend an array's element list
//! - **Stack growth**: red zone and segment size for simulated calls

// =============================================================================
// Derivation
// =============================================================================

/// Default number of worklist passes run by a scope derivation.
///
/// One pass derives and reduces every chain entry once. Chains whose values
/// depend on entries that are only resolved later in the same pass need a
/// second pass to settle.
///
/// ```javascript
/// var a = b;     // first pass: `b` is still unknown here
/// var b = 1;
/// // ...only hoisted/declared-before relationships resolve in one pass
/// ```
pub const DEFAULT_ORDER: usize = 1;

// =============================================================================
// Program points
// =============================================================================

/// Multiplier applied to a line number when encoding a position as a
/// program point.
///
/// Columns are added to `line * COLUMN_SPAN`. The span covers every `u32`
/// column, so positions on one line stay strictly before the next line even
/// for single-line minified bundles.
pub const COLUMN_SPAN: i64 = 1 << 32;

// =============================================================================
// Arrays
// =============================================================================

/// Writes landing further than this past the end of an array's element list
/// are kept as sparse properties instead of growing the list.
///
/// ```javascript
/// var a = [];
/// a[1e9] = 1;   // stored under the key "1000000000", no holes allocated
/// ```
pub const MAX_ARRAY_GAP: usize = 1024;

// =============================================================================
// Stack growth
// =============================================================================

/// Remaining stack below which a simulated call grows a new stack segment.
///
/// Function simulation is re-entrant: deriving a call expression executes the
/// callee, whose body derivation may execute further calls. Each level costs
/// several frames of the engine, so nested call chains are run on segments
/// allocated through `stacker` once the remaining stack drops below this.
pub const STACK_RED_ZONE: usize = 256 * 1024;

/// Size of each stack segment allocated by `stacker` for simulated calls and
/// recursive value construction.
pub const STACK_SEGMENT_SIZE: usize = 4 * 1024 * 1024;
