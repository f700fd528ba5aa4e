use fontswf::{
    convert_font,
    edges::outline_to_edges,
    inspect::{DefineFont3Summary, Layout},
    outline::OutlineReader,
    ConvertError, ConvertOptions,
};
use pretty_assertions::assert_eq;
use skrifa::raw::{types::GlyphId, FontRef};
use swf_codec::{Container, ContainerError, Edge, Rect, Shape, Tag, TagCode, EMPTY_SHAPE};
use swf_test_data::{
    container::{self, REFERENCE_FONT_ID, REFERENCE_FONT_NAME, REFERENCE_SWF, REFERENCE_TAG_COUNT},
    fonts::{self, gids},
};

const SCALE: f64 = 20.48;

/// The mapped code points of the test font plus tab and carriage return.
const EXPECTED_CODES: &[u16] = &[
    0x09, 0x0A, 0x0D, 0x20, 0x31, 0x32, 0x41, 0x42, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x50,
    0x53, 0x4E2D, 0xFFFF,
];

fn convert(font: &[u8], reference: &[u8], options: &ConvertOptions) -> Vec<u8> {
    convert_font(font, reference, options, None).unwrap()
}

fn convert_reference() -> Vec<u8> {
    convert(
        &fonts::test_font(),
        REFERENCE_SWF,
        &ConvertOptions::default(),
    )
}

fn font_tag(container: &Container, font_id: u16) -> &Tag {
    container
        .tags_with_code(TagCode::DEFINE_FONT3)
        .find(|tag| tag.data[..2] == font_id.to_le_bytes())
        .unwrap()
}

fn summary(output: &[u8]) -> DefineFont3Summary {
    let container = Container::parse(output).unwrap();
    DefineFont3Summary::parse(&font_tag(&container, REFERENCE_FONT_ID).data).unwrap()
}

fn glyph_index(font: &DefineFont3Summary, ch: char) -> usize {
    let code = (ch as u32).min(0xFFFF) as u16;
    font.codes.iter().position(|c| *c == code).unwrap()
}

fn layout(font: &DefineFont3Summary) -> &Layout {
    font.layout.as_ref().unwrap()
}

fn close_point(contour: &[Edge]) -> ((i32, i32), (i32, i32)) {
    let Edge::MoveTo { x, y } = contour[0] else {
        panic!("contour starts with {:?}", contour[0]);
    };
    let end = contour[1..]
        .iter()
        .fold((x, y), |pen, edge| edge.end_point(pen));
    ((x, y), end)
}

#[test]
fn parallel_tables_have_one_entry_per_code_point() {
    let font = summary(&convert_reference());
    assert_eq!(font.codes, EXPECTED_CODES);
    assert_eq!(font.offsets.len(), EXPECTED_CODES.len());
    assert_eq!(font.shapes.len(), EXPECTED_CODES.len());
    assert_eq!(layout(&font).advances.len(), EXPECTED_CODES.len());
    assert_eq!(layout(&font).bounds.len(), EXPECTED_CODES.len());
    assert_eq!(layout(&font).kerning_count, 0);
}

#[test]
fn offsets_cover_the_shape_data() {
    let output = convert_reference();
    let container = Container::parse(&output).unwrap();
    let payload = &font_tag(&container, REFERENCE_FONT_ID).data;
    let font = DefineFont3Summary::parse(payload).unwrap();
    let table_start = 5 + REFERENCE_FONT_NAME.len() + 2;
    let num_glyphs = font.num_glyphs() as u32;

    assert_eq!(font.offsets[0], 4 * (num_glyphs + 1));
    assert!(font.offsets.windows(2).all(|pair| pair[0] < pair[1]));
    let mut shape_bytes = 0;
    for offset in &font.offsets {
        let (_, len) = Shape::decode(&payload[table_start + *offset as usize..]).unwrap();
        shape_bytes += len as u32;
    }
    assert_eq!(font.code_table_offset, 4 * (num_glyphs + 1) + shape_bytes);
}

#[test]
fn identity_and_metrics() {
    let font = summary(&convert_reference());
    assert_eq!(font.font_id, REFERENCE_FONT_ID);
    assert_eq!(font.flags, 0x8C);
    assert_eq!(font.language_code, 5);
    assert_eq!(font.name, REFERENCE_FONT_NAME);
    let layout = layout(&font);
    assert_eq!(
        (layout.ascent, layout.descent, layout.leading),
        (16384, 4096, 1843)
    );
}

#[test]
fn square_is_four_lines() {
    let font = summary(&convert_reference());
    let index = glyph_index(&font, 'A');
    let shape = &font.shapes[index];
    assert_eq!(shape.fill_style0, Some(1));
    assert_eq!(
        shape.contours,
        [vec![
            Edge::MoveTo { x: 2048, y: 0 },
            Edge::LineTo { dx: 0, dy: -14336 },
            Edge::LineTo { dx: 10240, dy: 0 },
            Edge::LineTo { dx: 0, dy: 14336 },
            Edge::LineTo { dx: -10240, dy: 0 },
        ]]
    );
    let layout = layout(&font);
    assert_eq!(layout.advances[index], 12288);
    assert_eq!(layout.bounds[index], Rect::new(0, 12288, -16384, 4096));
}

#[test]
fn implied_midpoint_quad() {
    let font = summary(&convert_reference());
    let shape = &font.shapes[glyph_index(&font, 'B')];
    assert_eq!(
        shape.contours,
        [vec![
            Edge::MoveTo { x: 0, y: 0 },
            Edge::QuadTo {
                control_dx: 0,
                control_dy: -10240,
                anchor_dx: 5120,
                anchor_dy: 0,
            },
            Edge::QuadTo {
                control_dx: 5120,
                control_dy: 0,
                anchor_dx: -10240,
                anchor_dy: 10240,
            },
        ]]
    );
}

#[test]
fn unmapped_and_control_code_points_are_blank() {
    let output = convert_reference();
    let font = summary(&output);
    for ch in ['\t', '\n', '\r'] {
        let index = glyph_index(&font, ch);
        assert!(font.shapes[index].is_empty(), "{ch:?}");
        assert_eq!(layout(&font).advances[index], 0);
        assert_eq!(layout(&font).bounds[index], Rect::ZERO);
    }
    // the empty shape is exactly two bytes
    let container = Container::parse(&output).unwrap();
    let payload = &font_tag(&container, REFERENCE_FONT_ID).data;
    let table_start = 5 + REFERENCE_FONT_NAME.len() + 2;
    let tab = table_start + font.offsets[0] as usize;
    assert_eq!(payload[tab..tab + 2], EMPTY_SHAPE);
    assert_eq!(font.offsets[1] - font.offsets[0], 2);
}

#[test]
fn blank_glyphs_keep_their_advance() {
    let font = summary(&convert_reference());
    let space = glyph_index(&font, ' ');
    assert!(font.shapes[space].is_empty());
    assert_eq!(layout(&font).advances[space], 5120);
    // a composite that only references itself has no geometry
    let recursive = glyph_index(&font, 'E');
    assert!(font.shapes[recursive].is_empty());
    assert_eq!(layout(&font).advances[recursive], 12288);
}

#[test]
fn failed_glyph_is_blank_and_zero_width() {
    let font = summary(&convert_reference());
    let index = glyph_index(&font, 'H');
    assert!(font.shapes[index].is_empty());
    assert_eq!(layout(&font).advances[index], 0);
    assert_eq!(layout(&font).bounds[index], Rect::ZERO);
    // neighbours are unaffected
    assert!(!font.shapes[glyph_index(&font, 'G')].is_empty());
    assert!(!font.shapes[glyph_index(&font, 'P')].is_empty());
}

#[test]
fn missing_component_is_skipped() {
    let font = summary(&convert_reference());
    let missing = glyph_index(&font, 'D');
    assert_eq!(font.shapes[missing], font.shapes[glyph_index(&font, 'A')]);
    assert_eq!(layout(&font).advances[missing], 12288);
}

#[test]
fn composite_nesting_limit() {
    let font = summary(&convert_reference());
    let within = glyph_index(&font, '1');
    assert_eq!(font.shapes[within], font.shapes[glyph_index(&font, 'A')]);
    let too_deep = glyph_index(&font, '2');
    assert!(font.shapes[too_deep].is_empty());
}

#[test]
fn wide_values_are_clamped() {
    let font = summary(&convert_reference());
    // 1700 units scale to 34816 twips
    let pair = glyph_index(&font, 'C');
    assert_eq!(layout(&font).advances[pair], i16::MAX);
    assert_eq!(layout(&font).bounds[pair].x_max, 34816);
    assert_eq!(font.codes.last(), Some(&0xFFFF));
    assert_eq!(font.shapes.last(), font.shapes.get(glyph_index(&font, 'A')));
}

#[test]
fn decoded_shapes_match_synthesized_edges() {
    let data = fonts::test_font();
    let source = FontRef::new(&data).unwrap();
    let outlines = OutlineReader::new(&source).unwrap();
    let font = summary(&convert_reference());
    for (ch, gid) in [
        ('A', gids::SQUARE),
        ('B', gids::CURVE),
        ('C', gids::PAIR),
        ('F', gids::ALL_OFF_CURVE),
        ('G', gids::DEGENERATE),
        ('P', gids::POINT_MATCHED),
        ('S', gids::SCALED),
    ] {
        let outline = outlines.outline(GlyphId::new(gid as u32)).unwrap().unwrap();
        let edges = outline_to_edges(&outline, SCALE).unwrap();
        assert_eq!(font.shapes[glyph_index(&font, ch)].contours, edges, "{ch}");
    }
}

#[test]
fn every_contour_is_closed() {
    let font = summary(&convert_reference());
    for shape in &font.shapes {
        for contour in &shape.contours {
            let (start, end) = close_point(contour);
            assert_eq!(start, end);
        }
    }
}

#[test]
fn other_tags_pass_through() {
    let output = convert_reference();
    let reference = Container::parse(REFERENCE_SWF).unwrap();
    let rebuilt = Container::parse(&output).unwrap();
    assert_eq!(rebuilt.tags.len(), REFERENCE_TAG_COUNT);
    assert_eq!(rebuilt.version, reference.version);
    assert_eq!(rebuilt.file_length as usize, output.len());
    assert_eq!(rebuilt.header_bytes(), reference.header_bytes());
    for (old, new) in reference.tags.iter().zip(&rebuilt.tags) {
        assert_eq!(old.code, new.code);
        let replaced = [TagCode::DEFINE_FONT3, TagCode::DEFINE_FONT_ALIGN_ZONES];
        if replaced.contains(&old.code) {
            assert_ne!(old.data, new.data);
        } else {
            assert_eq!(old, new);
        }
    }
    assert_eq!(rebuilt.tags.last().map(|tag| tag.code), Some(TagCode::END));
}

#[test]
fn align_zones_cover_every_glyph() {
    let output = convert_reference();
    let container = Container::parse(&output).unwrap();
    let zones = container
        .tags_with_code(TagCode::DEFINE_FONT_ALIGN_ZONES)
        .next()
        .unwrap();
    assert_eq!(zones.data.len(), 3 + 10 * EXPECTED_CODES.len());
    assert_eq!(zones.data[..3], [0x01, 0x00, 0x40]);
    assert!(zones.data[3..]
        .chunks(10)
        .all(|record| record == [2, 0, 0, 0, 0, 0, 0, 0, 0, 3]));
}

#[test]
fn compressed_reference_gives_the_same_output() {
    let font = fonts::test_font();
    let options = ConvertOptions::default();
    let from_compressed = convert(&font, &container::compressed_reference(), &options);
    assert_eq!(&from_compressed[..3], b"FWS");
    assert_eq!(from_compressed, convert(&font, REFERENCE_SWF, &options));
}

#[test]
fn parallel_and_sequential_agree() {
    let font = fonts::test_font();
    let parallel = convert(&font, REFERENCE_SWF, &ConvertOptions::default());
    let sequential = convert(
        &font,
        REFERENCE_SWF,
        &ConvertOptions {
            parallel: false,
            checkpoint_interval: 4,
            ..Default::default()
        },
    );
    assert_eq!(parallel, sequential);
}

#[test]
fn progress_is_reported_per_batch() {
    let mut lines = Vec::new();
    let mut sink = |line: &str| lines.push(line.to_owned());
    let options = ConvertOptions {
        checkpoint_interval: 5,
        ..Default::default()
    };
    let font = fonts::test_font();
    let with_progress = convert_font(&font, REFERENCE_SWF, &options, Some(&mut sink)).unwrap();
    assert_eq!(lines[0], "converting 18 glyphs");
    let failure = "glyph U+0048 failed";
    assert!(lines.iter().any(|line| line.starts_with(failure)));
    let checkpoints: Vec<_> = lines
        .iter()
        .filter(|line| line.ends_with("glyphs converted"))
        .map(String::as_str)
        .collect();
    assert_eq!(
        checkpoints,
        [
            "5/18 glyphs converted",
            "10/18 glyphs converted",
            "15/18 glyphs converted",
            "18/18 glyphs converted",
        ]
    );
    // a sink does not change the result
    assert_eq!(with_progress, convert(&font, REFERENCE_SWF, &options));
}

#[test]
fn identity_overrides() {
    let options = ConvertOptions {
        font_name: Some("Noto Sans".into()),
        language_code: Some(1),
        ..Default::default()
    };
    let font = summary(&convert(&fonts::test_font(), REFERENCE_SWF, &options));
    assert_eq!(font.name, "Noto Sans");
    assert_eq!(font.language_code, 1);
    assert_eq!(font.font_id, REFERENCE_FONT_ID);
}

#[test]
fn custom_control_set() {
    let options = ConvertOptions {
        control_chars: Vec::new(),
        ..Default::default()
    };
    let font = summary(&convert(&fonts::test_font(), REFERENCE_SWF, &options));
    assert_eq!(font.num_glyphs(), EXPECTED_CODES.len() - 2);
    let newline = glyph_index(&font, '\n');
    assert_eq!(font.shapes[newline], font.shapes[glyph_index(&font, 'A')]);
}

#[test]
fn fonts_without_metrics_use_defaults() {
    let font = summary(&convert(
        &fonts::font_without_metrics(),
        REFERENCE_SWF,
        &ConvertOptions::default(),
    ));
    let layout = layout(&font);
    assert_eq!(
        (layout.ascent, layout.descent, layout.leading),
        (16384, 4096, 0)
    );
    let index = glyph_index(&font, 'A');
    assert_eq!(layout.advances[index], 20480);
    assert_eq!(layout.bounds[index], Rect::new(0, 20480, -16384, 4096));
}

#[test]
fn only_the_selected_font_is_replaced() {
    let reference = container::two_font_swf();
    let original = Container::parse(&reference).unwrap();
    let font = fonts::test_font();

    let options = ConvertOptions {
        font_id: Some(REFERENCE_FONT_ID),
        ..Default::default()
    };
    let rebuilt = Container::parse(&convert(&font, &reference, &options)).unwrap();
    assert_eq!(rebuilt.tags[..2], original.tags[..2]);
    assert_ne!(rebuilt.tags[2], original.tags[2]);
    assert_ne!(rebuilt.tags[3], original.tags[3]);
    assert_eq!(rebuilt.tags[4..], original.tags[4..]);

    // without an id the first font is replaced and keeps its own name
    let rebuilt =
        Container::parse(&convert(&font, &reference, &ConvertOptions::default())).unwrap();
    assert_eq!(rebuilt.tags[2..], original.tags[2..]);
    let first = DefineFont3Summary::parse(&rebuilt.tags[0].data).unwrap();
    assert_eq!((first.font_id, first.name.as_str()), (2, "Other"));
    assert_eq!(rebuilt.tags[1].data.len(), 3 + 10 * EXPECTED_CODES.len());
}

#[test]
fn font_without_outlines_is_rejected() {
    let result = convert_font(
        &fonts::font_without_glyf(),
        REFERENCE_SWF,
        &ConvertOptions::default(),
        None,
    );
    assert!(matches!(result, Err(ConvertError::UnsupportedFontFormat(_))));
    let result = convert_font(
        b"not a font",
        REFERENCE_SWF,
        &ConvertOptions::default(),
        None,
    );
    assert!(matches!(result, Err(ConvertError::UnsupportedFontFormat(_))));
}

#[test]
fn font_without_cmap_is_rejected() {
    let result = convert_font(
        &fonts::font_without_cmap(),
        REFERENCE_SWF,
        &ConvertOptions::default(),
        None,
    );
    assert!(matches!(result, Err(ConvertError::MissingCharacterMap)));
}

#[test]
fn malformed_references_are_rejected() {
    let font = fonts::test_font();
    let options = ConvertOptions::default();

    let mut unknown = REFERENCE_SWF.to_vec();
    unknown[0] = b'Z';
    assert!(matches!(
        convert_font(&font, &unknown, &options, None),
        Err(ConvertError::MalformedContainer(ContainerError::UnknownSignature(_)))
    ));

    let without_end = &REFERENCE_SWF[..REFERENCE_SWF.len() - 2];
    assert!(matches!(
        convert_font(&font, without_end, &options, None),
        Err(ConvertError::MalformedContainer(ContainerError::MissingEndTag))
    ));

    assert!(matches!(
        convert_font(&font, &container::fontless_swf(), &options, None),
        Err(ConvertError::MissingFontDefinition)
    ));

    let missing_id = ConvertOptions {
        font_id: Some(42),
        ..Default::default()
    };
    assert!(matches!(
        convert_font(&font, REFERENCE_SWF, &missing_id, None),
        Err(ConvertError::MissingFontDefinition)
    ));
}

#[test]
fn out_of_range_glyphs_are_blank() {
    // 1.2e6 twips per unit: the metrics and the 700 unit square fit, the
    // composites reaching 1100 and 1200 units do not
    let mut lines = Vec::new();
    let mut sink = |line: &str| lines.push(line.to_owned());
    let options = ConvertOptions {
        em_square: 1.2e9,
        ..Default::default()
    };
    let font = fonts::test_font();
    let output = convert_font(&font, REFERENCE_SWF, &options, Some(&mut sink)).unwrap();
    let font = summary(&output);
    assert_eq!(font.codes, EXPECTED_CODES);
    let layout = layout(&font);
    assert_eq!(layout.ascent, i16::MAX);

    let square = glyph_index(&font, 'A');
    assert!(!font.shapes[square].is_empty());
    assert_eq!(layout.advances[square], i16::MAX);
    assert_eq!(
        layout.bounds[square],
        Rect::new(0, 720_000_000, -960_000_000, 240_000_000)
    );
    for ch in ['C', 'P'] {
        let index = glyph_index(&font, ch);
        assert!(font.shapes[index].is_empty(), "{ch}");
        assert_eq!(layout.advances[index], 0, "{ch}");
        assert_eq!(layout.bounds[index], Rect::ZERO, "{ch}");
    }
    assert!(lines.contains(&"glyph U+0043 failed: coordinates out of range".to_owned()));
}

#[test]
fn unusable_em_square_is_rejected() {
    let font = fonts::test_font();
    for em_square in [0.0, -1.0, f64::NAN, f64::INFINITY, 3e9] {
        let options = ConvertOptions {
            em_square,
            ..Default::default()
        };
        assert!(
            matches!(
                convert_font(&font, REFERENCE_SWF, &options, None),
                Err(ConvertError::InvalidEmSquare(_))
            ),
            "{em_square}"
        );
    }
}
