// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Fixed helpers for byte arrays treated as little-endian bit strings.

use core::cmp::Ordering;

fn byte_at(bytes: &[u8], index: usize) -> u8 {
    bytes.get(index).copied().unwrap_or(0)
}

/// Apply `f` bytewise. The shorter operand is zero-extended at its most
/// significant end.
pub fn zip_bytes(a: &[u8], b: &[u8], f: impl Fn(u8, u8) -> u8) -> Vec<u8> {
    (0..a.len().max(b.len()))
        .map(|i| f(byte_at(a, i), byte_at(b, i)))
        .collect()
}

pub fn not_bytes(a: &[u8]) -> Vec<u8> {
    a.iter().map(|b| !b).collect()
}

fn bit(bytes: &[u8], index: i64) -> bool {
    if index < 0 {
        return false;
    }
    let index = index as usize;
    byte_at(bytes, index / 8) & (1 << (index % 8)) != 0
}

fn shift(bytes: &[u8], towards_msb: i64) -> Vec<u8> {
    let width = (bytes.len() * 8) as i64;
    let mut out = vec![0u8; bytes.len()];
    for i in 0..width {
        let Some(source) = i.checked_sub(towards_msb) else {
            continue;
        };
        if source < width && bit(bytes, source) {
            out[(i / 8) as usize] |= 1 << (i % 8);
        }
    }
    out
}

/// Shift towards the most significant bit. The width is fixed; bits shifted
/// out are dropped. A negative count shifts the other way.
pub fn shift_left(bytes: &[u8], count: i64) -> Vec<u8> {
    shift(bytes, count)
}

pub fn shift_right(bytes: &[u8], count: i64) -> Vec<u8> {
    shift(bytes, count.saturating_neg())
}

pub fn shift_left_i64(value: i64, count: i64) -> i64 {
    match count {
        c if c < 0 => shift_right_i64(value, c.saturating_neg()),
        c if c >= 64 => 0,
        c => value << c,
    }
}

pub fn shift_right_i64(value: i64, count: i64) -> i64 {
    match count {
        c if c < 0 => shift_left_i64(value, c.saturating_neg()),
        c if c >= 64 => {
            if value < 0 {
                -1
            } else {
                0
            }
        }
        c => value >> c,
    }
}

/// Compare two byte arrays as unsigned numbers, most significant byte first.
pub fn compare_bytes(a: &[u8], b: &[u8]) -> Ordering {
    (0..a.len().max(b.len()))
        .rev()
        .map(|i| byte_at(a, i).cmp(&byte_at(b, i)))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}
