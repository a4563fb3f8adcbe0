//! End-to-end coverage of the object layer over crafted COFF images:
//! minimal objects, PE32 wrappers, import libraries, long section names,
//! symbol classification and relocations.

mod common;

use coffscope::{
    object::types::{
        IMAGE_FILE_MACHINE_AMD64, IMAGE_FILE_MACHINE_I386, IMAGE_SYM_ABSOLUTE,
        IMAGE_SYM_CLASS_EXTERNAL, IMAGE_SYM_CLASS_STATIC, IMAGE_SYM_CLASS_WEAK_EXTERNAL,
        IMAGE_SYM_UNDEFINED,
    },
    Arch, CoffImage, Error, ObjectFile, SymbolFlags, SymbolKind,
};
use common::{add_string, short_name, ObjectBuilder, Pe32Builder, SectionSpec, SymbolSpec};

const CNT_CODE: u32 = 0x0000_0020;
const CNT_INITIALIZED_DATA: u32 = 0x0000_0040;
const MEM_EXECUTE: u32 = 0x2000_0000;
const MEM_READ: u32 = 0x4000_0000;
const MEM_WRITE: u32 = 0x8000_0000;

fn minimal_object() -> ObjectBuilder {
    let mut builder = ObjectBuilder::new(IMAGE_FILE_MACHINE_AMD64);
    builder.sections.push(SectionSpec::new(
        ".text",
        0x1000,
        CNT_CODE | MEM_READ | MEM_EXECUTE,
        vec![0x90, 0x90, 0xC3],
    ));

    let mut foo = SymbolSpec::new(short_name("foo"), 0, 1, IMAGE_SYM_CLASS_EXTERNAL);
    foo.symbol_type = 0x20; // complex type: function
    builder.symbols.push(foo);

    builder
}

#[test]
fn minimal_object_with_one_symbol() {
    let image = CoffImage::from_mem(minimal_object().build()).unwrap();

    assert_eq!(image.file_format_name(), "COFF-x86-64");
    assert_eq!(image.arch(), Arch::X86_64);
    assert_eq!(image.bytes_in_address(), 8);
    assert!(image.pe32_header().is_none());
    assert!(image.pe32plus_header().is_none());
    assert!(image.metadata().is_none());

    let sections: Vec<_> = image.sections().collect();
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].name().unwrap(), ".text");
    assert!(sections[0].is_text());
    assert!(!sections[0].is_data());
    assert!(sections[0].is_readonly());
    assert_eq!(sections[0].contents().unwrap(), &[0x90, 0x90, 0xC3]);

    let symbols: Vec<_> = image.symbols().collect();
    assert_eq!(symbols.len(), 1);

    let foo = &symbols[0];
    assert_eq!(foo.name().unwrap(), "foo");
    assert_eq!(foo.kind().unwrap(), SymbolKind::Function);
    assert!(foo.flags().contains(SymbolFlags::GLOBAL));
    assert!(!foo.flags().contains(SymbolFlags::UNDEFINED));
    assert_eq!(foo.address().unwrap(), Some(0x1000));
    assert_eq!(foo.size().unwrap(), 3);
}

#[test]
fn file_format_name_per_machine() {
    let i386 = ObjectBuilder::new(IMAGE_FILE_MACHINE_I386).build();
    let image = CoffImage::from_mem(i386).unwrap();
    assert_eq!(image.file_format_name(), "COFF-i386");
    assert_eq!(image.arch(), Arch::X86);
    assert_eq!(image.bytes_in_address(), 4);

    let other = ObjectBuilder::new(0x01C4).build(); // ARMNT
    let image = CoffImage::from_mem(other).unwrap();
    assert_eq!(image.file_format_name(), "COFF-<unknown arch>");
    assert_eq!(image.arch(), Arch::Unknown);
    assert_eq!(image.bytes_in_address(), 4);
}

#[test]
fn pe32_with_mz_stub() {
    let mut builder = Pe32Builder::new(IMAGE_FILE_MACHINE_I386);
    builder.image_base = 0x0040_0000;
    let image = CoffImage::from_mem(builder.build()).unwrap();

    assert!(image.pe32_header().is_some());
    assert!(image.pe32plus_header().is_none());
    assert_eq!(image.image_base(), Some(0x0040_0000));
    assert_eq!(image.data_directory_count(), 16);

    for index in 0..16 {
        let dir = image.data_directory(index).unwrap();
        assert_eq!(dir.virtual_address, 0);
        assert_eq!(dir.size, 0);
    }
    assert!(image.data_directory(16).is_err());

    assert_eq!(image.sections().count(), 0);
    assert_eq!(image.symbols().count(), 0);
}

#[test]
fn pe32plus_with_wide_image_base() {
    let mut image = vec![0_u8; 0x80];
    image[0] = 0x4D;
    image[1] = 0x5A;
    image[0x3C..0x3E].copy_from_slice(&0x80_u16.to_le_bytes());
    image.extend_from_slice(b"PE\0\0");

    // COFF header: x86-64, no sections, a 112-byte optional header.
    image.extend_from_slice(&IMAGE_FILE_MACHINE_AMD64.to_le_bytes());
    image.extend_from_slice(&0_u16.to_le_bytes());
    image.extend_from_slice(&[0_u8; 12]);
    image.extend_from_slice(&112_u16.to_le_bytes());
    image.extend_from_slice(&0x22_u16.to_le_bytes());

    // PE32+ optional header with an image base above 4 GiB.
    let optional_start = image.len();
    image.extend_from_slice(&0x20B_u16.to_le_bytes());
    image.resize(optional_start + 24, 0);
    image.extend_from_slice(&0x0001_8000_0000_u64.to_le_bytes());
    image.resize(optional_start + 112, 0); // number_of_rva_and_size = 0

    let image = CoffImage::from_mem(image).unwrap();

    let header = image.pe32plus_header().unwrap();
    assert_eq!(header.magic, 0x20B);
    assert_eq!(header.image_base, 0x0001_8000_0000);
    assert!(image.pe32_header().is_none());

    assert_eq!(image.image_base(), Some(0x0001_8000_0000));
    assert_eq!(image.arch(), Arch::X86_64);
    assert_eq!(image.bytes_in_address(), 8);
    assert_eq!(image.data_directory_count(), 0);
    assert!(image.data_directory(0).is_err());
}

#[test]
fn unknown_optional_header_magic_fails() {
    let mut image = vec![0_u8; 0x80];
    image[0] = 0x4D;
    image[1] = 0x5A;
    image[0x3C..0x3E].copy_from_slice(&0x80_u16.to_le_bytes());
    image.extend_from_slice(b"PE\0\0");
    image.extend_from_slice(&IMAGE_FILE_MACHINE_I386.to_le_bytes());
    image.extend_from_slice(&0_u16.to_le_bytes());
    image.extend_from_slice(&[0_u8; 12]);
    image.extend_from_slice(&96_u16.to_le_bytes());
    image.extend_from_slice(&0_u16.to_le_bytes());
    image.extend_from_slice(&0x30B_u16.to_le_bytes()); // neither PE32 nor PE32+
    image.resize(image.len() + 128, 0);

    assert!(matches!(
        CoffImage::from_mem(image),
        Err(Error::Malformed { .. })
    ));
}

#[test]
fn import_library_sentinel_stops_parsing() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&IMAGE_FILE_MACHINE_I386.to_le_bytes());
    bytes.extend_from_slice(&0xFFFF_u16.to_le_bytes()); // section count sentinel
    bytes.extend_from_slice(&0_u32.to_le_bytes());
    bytes.extend_from_slice(&0x1234_u32.to_le_bytes()); // bogus symbol pointer
    bytes.extend_from_slice(&99_u32.to_le_bytes()); // bogus symbol count
    bytes.extend_from_slice(&0_u16.to_le_bytes());
    bytes.extend_from_slice(&0_u16.to_le_bytes());

    let image = CoffImage::from_mem(bytes).unwrap();

    assert!(image.coff_header().is_import_library());
    assert_eq!(image.sections().count(), 0);
    assert_eq!(image.symbols().count(), 0);
    assert_eq!(image.imports().count(), 0);
    assert_eq!(image.exports().count(), 0);
    assert!(image.metadata().is_none());
}

#[test]
fn long_section_names_via_string_table() {
    let mut builder = ObjectBuilder::new(IMAGE_FILE_MACHINE_AMD64);

    let offset = add_string(&mut builder.string_table, "verylongname");
    assert_eq!(offset, 4);

    // Same offset, referenced once in decimal and once in base 64.
    builder.sections.push(SectionSpec::new(
        "/4",
        0x1000,
        CNT_INITIALIZED_DATA | MEM_READ,
        vec![0xAA],
    ));
    builder.sections.push(SectionSpec::new(
        "//AAAAAE",
        0x2000,
        CNT_INITIALIZED_DATA | MEM_READ,
        vec![0xBB],
    ));

    let image = CoffImage::from_mem(builder.build()).unwrap();
    let sections: Vec<_> = image.sections().collect();

    assert_eq!(sections[0].name().unwrap(), "verylongname");
    assert_eq!(sections[1].name().unwrap(), "verylongname");
}

#[test]
fn section_name_round_trip_through_index() {
    let mut builder = ObjectBuilder::new(IMAGE_FILE_MACHINE_AMD64);
    builder.sections.push(SectionSpec::new(
        ".text",
        0x1000,
        CNT_CODE | MEM_READ,
        vec![0xC3],
    ));
    builder.sections.push(SectionSpec::new(
        ".rdata",
        0x2000,
        CNT_INITIALIZED_DATA | MEM_READ,
        vec![0x00],
    ));

    let image = CoffImage::from_mem(builder.build()).unwrap();

    for section in image.sections() {
        let name = section.name().unwrap();
        let by_index = image
            .section(section.index() as i16 + 1)
            .unwrap()
            .unwrap();
        assert_eq!(image.section_name(by_index).unwrap(), name);
    }
}

#[test]
fn symbol_iteration_skips_aux_records() {
    let mut builder = minimal_object();

    // A section-definition style symbol with one aux record, then a
    // trailing symbol that must still be reached.
    let mut sect_sym = SymbolSpec::new(short_name(".text"), 0, 1, IMAGE_SYM_CLASS_STATIC);
    sect_sym.aux.push([0xEE; 18]);
    builder.symbols.push(sect_sym);
    builder
        .symbols
        .push(SymbolSpec::new(short_name("bar"), 1, 1, IMAGE_SYM_CLASS_EXTERNAL));

    let image = CoffImage::from_mem(builder.build()).unwrap();
    assert_eq!(image.coff_header().number_of_symbols, 4);

    let symbols: Vec<_> = image.symbols().collect();
    assert_eq!(symbols.len(), 3);
    assert_eq!(symbols[0].name().unwrap(), "foo");
    assert_eq!(symbols[1].name().unwrap(), ".text");
    assert_eq!(symbols[2].name().unwrap(), "bar");

    let aux = symbols[1].aux_data().unwrap();
    assert_eq!(aux.len(), 18);
    assert!(aux.iter().all(|&b| b == 0xEE));
    assert_eq!(symbols[0].aux_data().unwrap().len(), 0);
}

#[test]
fn symbol_names_from_string_table() {
    let mut builder = minimal_object();
    let offset = add_string(&mut builder.string_table, "a_rather_long_symbol_name");
    builder.symbols.push(SymbolSpec::new(
        SymbolSpec::long_name(offset),
        0,
        1,
        IMAGE_SYM_CLASS_EXTERNAL,
    ));

    let image = CoffImage::from_mem(builder.build()).unwrap();
    let symbols: Vec<_> = image.symbols().collect();

    assert_eq!(symbols[1].name().unwrap(), "a_rather_long_symbol_name");
}

#[test]
fn symbol_classification() {
    let mut builder = ObjectBuilder::new(IMAGE_FILE_MACHINE_AMD64);
    builder.sections.push(SectionSpec::new(
        ".rdata",
        0x1000,
        CNT_INITIALIZED_DATA | MEM_READ,
        vec![0x01, 0x02, 0x03, 0x04],
    ));
    builder.sections.push(SectionSpec::new(
        ".data",
        0x2000,
        CNT_INITIALIZED_DATA | MEM_READ | MEM_WRITE,
        vec![0x05, 0x06],
    ));

    builder.symbols.push(SymbolSpec::new(
        short_name("undef"),
        0,
        IMAGE_SYM_UNDEFINED,
        IMAGE_SYM_CLASS_EXTERNAL,
    ));
    builder.symbols.push(SymbolSpec::new(
        short_name("common"),
        16,
        IMAGE_SYM_UNDEFINED,
        IMAGE_SYM_CLASS_EXTERNAL,
    ));
    builder.symbols.push(SymbolSpec::new(
        short_name("weak"),
        0,
        1,
        IMAGE_SYM_CLASS_WEAK_EXTERNAL,
    ));
    builder.symbols.push(SymbolSpec::new(
        short_name("abs"),
        0x42,
        IMAGE_SYM_ABSOLUTE,
        IMAGE_SYM_CLASS_STATIC,
    ));
    builder.symbols.push(SymbolSpec::new(
        short_name("ro"),
        2,
        1,
        IMAGE_SYM_CLASS_STATIC,
    ));
    builder.symbols.push(SymbolSpec::new(
        short_name("rw"),
        0,
        2,
        IMAGE_SYM_CLASS_STATIC,
    ));

    let image = CoffImage::from_mem(builder.build()).unwrap();
    let symbols: Vec<_> = image.symbols().collect();

    let undef = &symbols[0];
    assert_eq!(undef.kind().unwrap(), SymbolKind::Unknown);
    assert!(undef.flags().contains(SymbolFlags::UNDEFINED));
    assert!(undef.flags().contains(SymbolFlags::GLOBAL));
    assert_eq!(undef.address().unwrap(), None);
    assert_eq!(undef.file_offset().unwrap(), None);
    assert_eq!(undef.size().unwrap(), 0);

    let common = &symbols[1];
    assert!(common.flags().contains(SymbolFlags::COMMON));
    assert!(!common.flags().contains(SymbolFlags::UNDEFINED));

    let weak = &symbols[2];
    assert!(weak.flags().contains(SymbolFlags::WEAK));
    assert!(!weak.flags().contains(SymbolFlags::GLOBAL));

    let abs = &symbols[3];
    assert!(abs.flags().contains(SymbolFlags::ABSOLUTE));
    // No section: the raw value is reported as the address.
    assert_eq!(abs.address().unwrap(), Some(0x42));

    let ro = &symbols[4];
    assert_eq!(ro.kind().unwrap(), SymbolKind::Data);
    assert_eq!(ro.address().unwrap(), Some(0x1002));
    assert_eq!(ro.size().unwrap(), 2);

    let rw = &symbols[5];
    assert_eq!(rw.kind().unwrap(), SymbolKind::Other);
}

#[test]
fn relocations_and_type_names() {
    let mut builder = minimal_object();
    builder.sections[0].relocations.push((0x1001, 0, 0x0004)); // REL32
    builder.sections[0].relocations.push((0x1005, 0, 0x00F0));

    let image = CoffImage::from_mem(builder.build()).unwrap();
    let section = image.sections().next().unwrap();

    let relocations: Vec<_> = section
        .relocations()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(relocations.len(), 2);

    assert_eq!(relocations[0].virtual_address(), 0x1001);
    assert_eq!(relocations[0].symbol_table_index(), 0);
    assert_eq!(relocations[0].type_name(), "IMAGE_REL_AMD64_REL32");
    assert_eq!(relocations[0].symbol().unwrap().name().unwrap(), "foo");

    assert_eq!(relocations[1].type_name(), "Unknown");

    assert!(matches!(
        relocations[0].address(),
        Err(Error::Unimplemented(_))
    ));
}

#[test]
fn section_alignment_nibble() {
    let mut builder = ObjectBuilder::new(IMAGE_FILE_MACHINE_AMD64);
    // Alignment nibble 4 = 8-byte alignment.
    builder.sections.push(SectionSpec::new(
        ".a",
        0x1000,
        CNT_CODE | 0x0040_0000,
        vec![0xC3],
    ));
    // No alignment information.
    builder
        .sections
        .push(SectionSpec::new(".b", 0x2000, CNT_CODE, vec![0xC3]));

    let image = CoffImage::from_mem(builder.build()).unwrap();
    let sections: Vec<_> = image.sections().collect();

    assert_eq!(sections[0].alignment(), 8);
    assert_eq!(sections[1].alignment(), 1);
}

#[test]
fn rva_and_va_resolution() {
    let mut builder = Pe32Builder::new(IMAGE_FILE_MACHINE_I386);
    builder.image_base = 0x0040_0000;
    builder.sections.push(SectionSpec::new(
        ".text",
        0x1000,
        CNT_CODE | MEM_READ | MEM_EXECUTE,
        vec![0xCC; 0x100],
    ));

    let image = CoffImage::from_mem(builder.build()).unwrap();

    assert_eq!(image.rva_to_offset(0x1000).unwrap(), 0x200);
    assert_eq!(image.rva_to_offset(0x10FF).unwrap(), 0x2FF);
    assert!(image.rva_to_offset(0x1100).is_err());
    assert!(image.rva_to_offset(0x0FFF).is_err());

    assert_eq!(image.va_to_offset(0x0040_1000).unwrap(), 0x200);
    assert!(matches!(
        image.va_to_offset(0x0030_0000),
        Err(Error::OutOfBounds)
    ));

    // The resolved offset stays inside the covering section's raw data.
    let offset = image.rva_to_offset(0x1080).unwrap();
    assert!(offset >= 0x200 && offset < 0x300);
}

#[test]
fn empty_string_table_rejects_lookups() {
    let image = CoffImage::from_mem(minimal_object().build()).unwrap();

    assert!(matches!(image.string(4), Err(Error::Malformed { .. })));
}

#[test]
fn string_table_offset_past_end() {
    let mut builder = minimal_object();
    add_string(&mut builder.string_table, "x");

    let image = CoffImage::from_mem(builder.build()).unwrap();

    assert_eq!(image.string(4).unwrap(), "x");
    assert!(matches!(image.string(1000), Err(Error::OutOfBounds)));
}

#[test]
fn invalid_encoded_section_names_fail() {
    let mut builder = ObjectBuilder::new(IMAGE_FILE_MACHINE_AMD64);
    add_string(&mut builder.string_table, "padding");

    // Out-of-alphabet base64 digit.
    let mut bad_base64 = SectionSpec::new("", 0x1000, CNT_CODE, vec![0xC3]);
    bad_base64.name = *b"//AB!CDE";
    builder.sections.push(bad_base64);

    // Non-numeric decimal offset.
    let mut bad_decimal = SectionSpec::new("", 0x2000, CNT_CODE, vec![0xC3]);
    bad_decimal.name = *b"/notanum";
    builder.sections.push(bad_decimal);

    let image = CoffImage::from_mem(builder.build()).unwrap();
    let sections: Vec<_> = image.sections().collect();

    assert!(matches!(
        sections[0].name(),
        Err(Error::Malformed { .. })
    ));
    assert!(matches!(
        sections[1].name(),
        Err(Error::Malformed { .. })
    ));
}
