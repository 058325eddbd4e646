use std::fmt::Write;

/// Formats a vector as pgvector text input (`[1,2.5,-3]`), to be bound as `$n::text::vector`.
pub fn vector_to_pg(vec: &[f32]) -> String {
	let mut out = String::with_capacity(vec.len() * 10 + 2);

	out.push('[');

	for (idx, value) in vec.iter().enumerate() {
		if idx > 0 {
			out.push(',');
		}

		let _ = write!(out, "{value}");
	}

	out.push(']');

	out
}

/// Whether `vec` can be stored in a `vector(dim)` column.
pub fn is_well_formed(vec: &[f32], dim: u32) -> bool {
	vec.len() == dim as usize && vec.iter().all(|value| value.is_finite())
}
