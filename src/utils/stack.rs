// src/utils/stack.rs
//! Caller stack capture
//!
//! Events carry a short snippet of the application stack that issued the
//! database call, with tracer-internal and runtime frames filtered out.
//! Diagnostic only; capture can be disabled per tracer.

use std::backtrace::Backtrace;

/// Frames containing any of these substrings are never part of the
/// application snippet.
const INTERNAL_MARKERS: &[&str] = &[
    "ormsanity::",
    "std::backtrace",
    "core::ops::function",
    "std::sys",
    "std::rt",
    "__rust_begin_short_backtrace",
];

/// Capture the current stack and return the first `max_lines` lines of
/// the application portion (everything below the tracer's own frames).
///
/// Returns an empty string when the backtrace is unavailable, which is
/// treated the same as capture being disabled.
pub fn caller_stack(max_lines: usize) -> String {
    let raw = Backtrace::force_capture().to_string();
    filter_stack(&raw, max_lines)
}

/// Walk the formatted backtrace: skip everything up to and including the
/// tracer's own frames, then keep the first `max_lines` lines after
/// them. Frame bodies ("at file:line" continuations) follow their frame
/// line and count toward `max_lines`, so the snippet stays fixed-size.
fn filter_stack(raw: &str, max_lines: usize) -> String {
    let mut out = String::new();
    let mut own_frames_seen = false;
    let mut consuming = false;
    let mut last_frame_internal = false;
    let mut lines_consumed = 0usize;

    for line in raw.lines() {
        // "at file:line" continuations belong to the preceding frame
        let continuation = line.trim_start().starts_with("at ");
        let internal = if continuation {
            last_frame_internal
        } else {
            let internal = INTERNAL_MARKERS.iter().any(|m| line.contains(m));
            last_frame_internal = internal;
            internal
        };

        if internal && !own_frames_seen {
            own_frames_seen = true;
        } else if own_frames_seen && !internal {
            consuming = true;
        }

        if consuming && !internal {
            out.push_str(line);
            out.push('\n');
            lines_consumed += 1;
            if lines_consumed >= max_lines {
                break;
            }
        }
    }

    // Capture ran without ever passing through a recognizable tracer
    // frame (inlined release build): fall back to the top of the stack.
    if out.is_empty() {
        for line in raw.lines().take(max_lines) {
            out.push_str(line);
            out.push('\n');
        }
    }

    out
}
