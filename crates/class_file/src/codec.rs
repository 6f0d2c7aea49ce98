use std::io::{self, Cursor, ErrorKind, Read, Write};

use byteorder::{ByteOrder, ReadBytesExt, WriteBytesExt};

use crate::{ClassFileError, Result};

/// Fixed-width unsigned integers that make up the class file wire format.
pub trait Primitive: Sized + Copy {
    const WIDTH: usize;

    fn read_from<E: ByteOrder>(r: &mut impl Read) -> io::Result<Self>;

    fn write_to<E: ByteOrder>(self, w: &mut impl Write) -> io::Result<()>;
}

impl Primitive for u8 {
    const WIDTH: usize = 1;

    fn read_from<E: ByteOrder>(r: &mut impl Read) -> io::Result<Self> {
        r.read_u8()
    }

    fn write_to<E: ByteOrder>(self, w: &mut impl Write) -> io::Result<()> {
        w.write_u8(self)
    }
}

impl Primitive for u16 {
    const WIDTH: usize = 2;

    fn read_from<E: ByteOrder>(r: &mut impl Read) -> io::Result<Self> {
        r.read_u16::<E>()
    }

    fn write_to<E: ByteOrder>(self, w: &mut impl Write) -> io::Result<()> {
        w.write_u16::<E>(self)
    }
}

impl Primitive for u32 {
    const WIDTH: usize = 4;

    fn read_from<E: ByteOrder>(r: &mut impl Read) -> io::Result<Self> {
        r.read_u32::<E>()
    }

    fn write_to<E: ByteOrder>(self, w: &mut impl Write) -> io::Result<()> {
        w.write_u32::<E>(self)
    }
}

impl Primitive for u64 {
    const WIDTH: usize = 8;

    fn read_from<E: ByteOrder>(r: &mut impl Read) -> io::Result<Self> {
        r.read_u64::<E>()
    }

    fn write_to<E: ByteOrder>(self, w: &mut impl Write) -> io::Result<()> {
        w.write_u64::<E>(self)
    }
}

/// Reads one `T` from the cursor. A short read leaves the cursor where it was
/// and reports the offset at which the value started.
pub fn read<T: Primitive, E: ByteOrder>(cursor: &mut Cursor<&[u8]>) -> Result<T> {
    let offset = cursor.position();
    T::read_from::<E>(cursor).map_err(|e| {
        cursor.set_position(offset);
        match e.kind() {
            ErrorKind::UnexpectedEof => ClassFileError::EndOfInput { offset },
            _ => ClassFileError::IOError(e),
        }
    })
}

pub fn write<T: Primitive, E: ByteOrder>(sink: &mut impl Write, value: T) -> Result<()> {
    Ok(value.write_to::<E>(sink)?)
}
