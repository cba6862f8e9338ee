/// Probes the byte order of the running machine by looking at how a known `u16` is laid out.
pub fn is_little_endian() -> bool {
    0x0102u16.to_ne_bytes()[0] == 0x02
}

pub fn is_big_endian() -> bool {
    !is_little_endian()
}
