use pretty_assertions::assert_eq;
use swf_codec::{Compression, Container, Rect, Shape, TagCode};
use swf_test_data::container::{self, REFERENCE_HEADER_LEN, REFERENCE_SWF, REFERENCE_TAG_COUNT};

#[test]
fn parse_reference() {
    let container = Container::parse(REFERENCE_SWF).unwrap();
    assert_eq!(container.compression, Compression::None);
    assert_eq!(container.version, 10);
    assert_eq!(container.file_length as usize, REFERENCE_SWF.len());
    assert_eq!(container.frame_rect, Rect::new(0, 11000, 0, 8000));
    assert_eq!(container.frame_rate, 0x1800);
    assert_eq!(container.frame_count, 1);
    assert_eq!(
        container.header_bytes(),
        &REFERENCE_SWF[8..REFERENCE_HEADER_LEN]
    );

    let codes: Vec<_> = container.tags.iter().map(|tag| tag.code).collect();
    assert_eq!(
        codes,
        [
            TagCode::FILE_ATTRIBUTES,
            TagCode::SET_BACKGROUND_COLOR,
            TagCode::DEFINE_FONT3,
            TagCode::DEFINE_FONT_ALIGN_ZONES,
            TagCode::DEFINE_FONT_NAME,
            TagCode::SHOW_FRAME,
            TagCode::END,
        ]
    );
    assert!(container.tags[1].long_header);
    assert_eq!(container.tags[1].data, [0xFF, 0xFF, 0xFF]);
}

#[test]
fn unchanged_rebuild_is_byte_identical() {
    let container = Container::parse(REFERENCE_SWF).unwrap();
    assert_eq!(container.to_bytes().unwrap(), REFERENCE_SWF);
}

#[test]
fn compressed_reference_parses_the_same() {
    let compressed = container::compressed_reference();
    assert_eq!(&compressed[..3], b"CWS");
    let parsed = Container::parse(&compressed).unwrap();
    assert_eq!(parsed.compression, Compression::Zlib);
    assert_eq!(parsed.tags, Container::parse(REFERENCE_SWF).unwrap().tags);
    // output is always uncompressed
    assert_eq!(parsed.to_bytes().unwrap(), REFERENCE_SWF);
}

#[test]
fn replaced_payload_is_reframed() {
    let container = Container::parse(REFERENCE_SWF).unwrap();
    let big = vec![0xAB; 100];
    let out = container
        .rebuild(|tag| (tag.code == TagCode::DEFINE_FONT_NAME).then(|| big.clone()))
        .unwrap();
    let rebuilt = Container::parse(&out).unwrap();
    assert_eq!(rebuilt.tags.len(), REFERENCE_TAG_COUNT);
    assert_eq!(rebuilt.file_length as usize, out.len());
    let name = &rebuilt.tags[4];
    assert_eq!(name.code, TagCode::DEFINE_FONT_NAME);
    assert!(name.long_header);
    assert_eq!(name.data, big);
    // the original payload was 12 bytes with a short header
    assert_eq!(out.len(), REFERENCE_SWF.len() - 14 + 106);
}

#[test]
fn reference_font_has_an_empty_shape() {
    let container = Container::parse(REFERENCE_SWF).unwrap();
    let font = container
        .tags_with_code(TagCode::DEFINE_FONT3)
        .next()
        .unwrap();
    // FontID, flags, language, name length, name, glyph count, one offset,
    // code table offset
    let shape_start = 5 + 8 + 2 + 4 + 4;
    let (shape, len) = Shape::decode(&font.data[shape_start..]).unwrap();
    assert!(shape.is_empty());
    assert_eq!(len, 2);
}
