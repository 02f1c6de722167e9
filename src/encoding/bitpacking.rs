/// Usual bitpacking
use bitpacking::BitPacker;
use bitpacking::BitPacker1x;

/// Returns the number of bits required to represent values up to and including `max`.
/// `log2(0) == 0`, since a value that can only ever be `0` needs no bits to encode.
pub fn log2(max: u64) -> u32 {
    64 - max.leading_zeros()
}

/// A streaming decoder over a bitpacked buffer, yielding `u32` values one at a time.
/// Decodes in [`BitPacker1x::BLOCK_LEN`]-sized chunks internally and buffers them.
pub struct Decoder<'a> {
    compressed: &'a [u8],
    num_bits: u8,
    remaining: usize,
    buffer: [u32; BitPacker1x::BLOCK_LEN],
    buffer_pos: usize,
    buffer_len: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(compressed: &'a [u8], num_bits: u8, length: usize) -> Self {
        Self {
            compressed,
            num_bits,
            remaining: length,
            buffer: [0; BitPacker1x::BLOCK_LEN],
            buffer_pos: 0,
            buffer_len: 0,
        }
    }

    fn load_chunk(&mut self) {
        let bitpacker = BitPacker1x::new();
        let chunk_bytes = BitPacker1x::BLOCK_LEN * self.num_bits as usize / 8;
        let available = self.compressed.len().min(chunk_bytes);

        // a block holds up to 32 bits per value, so BLOCK_LEN * 4 bytes is always enough
        let mut padded = [0u8; BitPacker1x::BLOCK_LEN * 4];
        padded[..available].copy_from_slice(&self.compressed[..available]);
        self.compressed = &self.compressed[available..];

        bitpacker.decompress(&padded[..chunk_bytes], &mut self.buffer, self.num_bits);
        self.buffer_pos = 0;
        self.buffer_len = BitPacker1x::BLOCK_LEN.min(self.remaining);
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.remaining == 0 {
            return None;
        }
        if self.buffer_pos >= self.buffer_len {
            self.load_chunk();
        }
        let value = self.buffer[self.buffer_pos];
        self.buffer_pos += 1;
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

pub fn required_capacity(length: u32) -> usize {
    let chunks_n = (length as usize + BitPacker1x::BLOCK_LEN - 1) / BitPacker1x::BLOCK_LEN;
    chunks_n * BitPacker1x::BLOCK_LEN
}

/// Decodes bitpacked bytes into `u32` values in `num_bits`.
pub fn decode(compressed: &[u8], num_bits: u8, decompressed: &mut [u32]) {
    let bitpacker = BitPacker1x::new();

    let chunks = compressed.chunks_exact(BitPacker1x::BLOCK_LEN);

    let remainder = chunks.remainder();

    let mut last_chunk = remainder.to_vec();
    last_chunk.extend(std::iter::repeat(0).take(BitPacker1x::BLOCK_LEN - remainder.len()));

    chunks
        .chain(std::iter::once(last_chunk.as_ref()))
        .enumerate()
        .for_each(|(i, chunk)| {
            bitpacker.decompress(
                &chunk,
                &mut decompressed[i * BitPacker1x::BLOCK_LEN..(i + 1) * BitPacker1x::BLOCK_LEN],
                num_bits,
            );
        });
}

fn encode(decompressed: &[u32], num_bits: u8, compressed: &mut [u8]) -> usize {
    let bitpacker = BitPacker1x::new();

    let chunks = decompressed.chunks_exact(BitPacker1x::BLOCK_LEN);

    let remainder = chunks.remainder();

    let mut last_chunk = remainder.to_vec();
    last_chunk.extend(std::iter::repeat(0).take(BitPacker1x::BLOCK_LEN - remainder.len()));

    let mut compressed_len = 0;
    chunks
        .chain(std::iter::once(last_chunk.as_ref()))
        .enumerate()
        .for_each(|(i, chunk)| {
            compressed_len += bitpacker.compress(
                &chunk,
                &mut compressed[i * BitPacker1x::BLOCK_LEN..(i + 1) * BitPacker1x::BLOCK_LEN],
                num_bits,
            );
        });
    compressed_len
}
