//! TrueType fonts assembled in memory.
//!
//! Every font shares one glyph set, described by the constants in [`gids`],
//! and one character map, described by [`MAPPINGS`]. Variants drop tables to
//! exercise fallbacks and fatal errors.

use write_fonts::{
    read::tables::glyf::CurvePoint,
    tables::{
        cmap::Cmap,
        glyf::{
            Anchor, Bbox, Component, ComponentFlags, CompositeGlyph, Contour, GlyfLocaBuilder,
            Glyph, SimpleGlyph, Transform,
        },
    },
    types::{F2Dot14, GlyphId, GlyphId16, Tag},
    FontBuilder,
};

pub const UNITS_PER_EM: u16 = 1000;

pub const TYPO_ASCENDER: i16 = 800;
pub const TYPO_DESCENDER: i16 = -200;
pub const TYPO_LINE_GAP: i16 = 90;

pub const DEFAULT_ADVANCE: u16 = 600;

/// Glyph ids of the shared glyph set.
pub mod gids {
    pub const NOTDEF: u16 = 0;
    /// One contour: on-curve (100, 0), (100, 700), (600, 700), (600, 0).
    pub const SQUARE: u16 = 1;
    /// One contour: on-curve (0, 0), then off-curve (0, 500) and (500, 500).
    pub const CURVE: u16 = 2;
    pub const SPACE: u16 = 3;
    /// [`SQUARE`] twice, the second moved 600 units right.
    pub const PAIR: u16 = 4;
    /// A component pointing past the end of the font, then [`SQUARE`].
    pub const MISSING_COMPONENT: u16 = 5;
    /// A composite whose only component is itself.
    pub const RECURSIVE: u16 = 6;
    /// One contour of four off-curve points on the square (0, 0)..(400, 400).
    pub const ALL_OFF_CURVE: u16 = 7;
    /// A single point contour followed by the [`SQUARE`] contour.
    pub const DEGENERATE: u16 = 8;
    /// [`SQUARE`] scaled by one half and moved by (100, 100).
    pub const SCALED: u16 = 9;
    /// [`SQUARE`], then [`SQUARE`] again positioned by matching its point 0
    /// to point 2 of the first copy.
    pub const POINT_MATCHED: u16 = 10;
    /// A single contour of [`super::HUGE_POINT_COUNT`] points.
    pub const HUGE: u16 = 11;
    /// [`HUGE`] four times, more points than a glyph may have.
    pub const OVERSIZED: u16 = 12;
    /// The first link of a chain of composites; each later link wraps the
    /// previous one and the first wraps [`SQUARE`].
    pub const CHAIN_START: u16 = 13;
    /// Resolving this link reaches [`SQUARE`] at nesting depth 10.
    pub const CHAIN_WITHIN_LIMIT: u16 = 22;
    /// Resolving this link needs nesting depth 11.
    pub const CHAIN_TOO_DEEP: u16 = 23;
    /// Does not exist in any of the fonts.
    pub const ABSENT: u16 = 999;
}

pub const NUM_GLYPHS: u16 = gids::CHAIN_TOO_DEEP + 1;

pub const HUGE_POINT_COUNT: usize = 16384;

/// The character map shared by the fonts that have one.
pub const MAPPINGS: &[(char, u16)] = &[
    // a control character the converter must blank
    ('\n', gids::SQUARE),
    (' ', gids::SPACE),
    ('1', gids::CHAIN_WITHIN_LIMIT),
    ('2', gids::CHAIN_TOO_DEEP),
    ('A', gids::SQUARE),
    ('B', gids::CURVE),
    ('C', gids::PAIR),
    ('D', gids::MISSING_COMPONENT),
    ('E', gids::RECURSIVE),
    ('F', gids::ALL_OFF_CURVE),
    ('G', gids::DEGENERATE),
    ('H', gids::OVERSIZED),
    ('P', gids::POINT_MATCHED),
    ('S', gids::SCALED),
    ('\u{4E2D}', gids::SQUARE),
    // outside the 16-bit code table range
    ('\u{1F600}', gids::SQUARE),
];

/// Horizontal advance in font units for each glyph.
pub fn advance(gid: u16) -> u16 {
    match gid {
        gids::SPACE => 250,
        // wide enough to overflow a 16-bit advance once scaled
        gids::PAIR => 1700,
        gids::POINT_MATCHED => 1100,
        _ => DEFAULT_ADVANCE,
    }
}

/// Which optional tables a font carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tables {
    pub glyf: bool,
    pub cmap: bool,
    pub os2: bool,
    pub hmtx: bool,
}

impl Default for Tables {
    fn default() -> Self {
        Tables {
            glyf: true,
            cmap: true,
            os2: true,
            hmtx: true,
        }
    }
}

/// The complete test font.
pub fn test_font() -> Vec<u8> {
    build_font(Tables::default())
}

/// A font with a character map but no outlines, like a CFF font.
pub fn font_without_glyf() -> Vec<u8> {
    build_font(Tables {
        glyf: false,
        ..Default::default()
    })
}

pub fn font_without_cmap() -> Vec<u8> {
    build_font(Tables {
        cmap: false,
        ..Default::default()
    })
}

/// A font without OS/2 or hmtx, so metrics fall back to defaults.
pub fn font_without_metrics() -> Vec<u8> {
    build_font(Tables {
        os2: false,
        hmtx: false,
        ..Default::default()
    })
}

pub fn build_font(tables: Tables) -> Vec<u8> {
    let mut builder = FontBuilder::new();
    let mut loca_format = 0;
    if tables.glyf {
        let mut glyf_builder = GlyfLocaBuilder::new();
        for glyph in glyphs() {
            glyf_builder.add_glyph(&glyph).expect("glyph should compile");
        }
        let (glyf, loca, format) = glyf_builder.build();
        loca_format = format as i16;
        builder.add_table(&glyf).expect("glyf should compile");
        builder.add_table(&loca).expect("loca should compile");
    }
    if tables.cmap {
        let cmap = Cmap::from_mappings(
            MAPPINGS
                .iter()
                .map(|(ch, gid)| (*ch, GlyphId::new(*gid as u32))),
        )
        .expect("mappings are unique");
        builder.add_table(&cmap).expect("cmap should compile");
    }
    builder.add_raw(Tag::new(b"head"), head(loca_format));
    builder.add_raw(Tag::new(b"maxp"), maxp());
    if tables.hmtx {
        builder.add_raw(Tag::new(b"hhea"), hhea());
        builder.add_raw(Tag::new(b"hmtx"), hmtx());
    }
    if tables.os2 {
        builder.add_raw(Tag::new(b"OS/2"), os2());
    }
    builder.build()
}

fn glyphs() -> Vec<Glyph> {
    let mut glyphs = vec![Glyph::Empty; NUM_GLYPHS as usize];
    let square = [
        (100, 0, true),
        (100, 700, true),
        (600, 700, true),
        (600, 0, true),
    ];
    glyphs[gids::SQUARE as usize] = Glyph::Simple(simple(&[&square]));
    glyphs[gids::CURVE as usize] = Glyph::Simple(simple(&[&[
        (0, 0, true),
        (0, 500, false),
        (500, 500, false),
    ]]));
    glyphs[gids::PAIR as usize] = Glyph::Composite(composite(&[
        (gids::SQUARE, Anchor::Offset { x: 0, y: 0 }),
        (gids::SQUARE, Anchor::Offset { x: 600, y: 0 }),
    ]));
    glyphs[gids::MISSING_COMPONENT as usize] = Glyph::Composite(composite(&[
        (gids::ABSENT, Anchor::Offset { x: 0, y: 0 }),
        (gids::SQUARE, Anchor::Offset { x: 0, y: 0 }),
    ]));
    glyphs[gids::RECURSIVE as usize] = Glyph::Composite(composite(&[(
        gids::RECURSIVE,
        Anchor::Offset { x: 0, y: 0 },
    )]));
    glyphs[gids::ALL_OFF_CURVE as usize] = Glyph::Simple(simple(&[&[
        (0, 0, false),
        (0, 400, false),
        (400, 400, false),
        (400, 0, false),
    ]]));
    glyphs[gids::DEGENERATE as usize] = Glyph::Simple(simple(&[&[(50, 50, true)], &square]));

    let half = F2Dot14::from_f32(0.5);
    let scaled = Component::new(
        GlyphId16::new(gids::SQUARE),
        Anchor::Offset { x: 100, y: 100 },
        Transform {
            xx: half,
            yy: half,
            ..Default::default()
        },
        ComponentFlags::default(),
    );
    glyphs[gids::SCALED as usize] = Glyph::Composite(CompositeGlyph::new(scaled, square_bbox()));

    glyphs[gids::POINT_MATCHED as usize] = Glyph::Composite(composite(&[
        (gids::SQUARE, Anchor::Offset { x: 0, y: 0 }),
        (
            gids::SQUARE,
            Anchor::Point {
                base: 2,
                component: 0,
            },
        ),
    ]));

    let huge: Vec<_> = (0..HUGE_POINT_COUNT)
        .map(|i| ((i % 128) as i16, (i / 128) as i16, true))
        .collect();
    glyphs[gids::HUGE as usize] = Glyph::Simple(simple(&[&huge]));
    glyphs[gids::OVERSIZED as usize] = Glyph::Composite(composite(
        &[(gids::HUGE, Anchor::Offset { x: 0, y: 0 }); 4],
    ));

    for gid in gids::CHAIN_START..=gids::CHAIN_TOO_DEEP {
        let inner = if gid == gids::CHAIN_START {
            gids::SQUARE
        } else {
            gid - 1
        };
        glyphs[gid as usize] =
            Glyph::Composite(composite(&[(inner, Anchor::Offset { x: 0, y: 0 })]));
    }
    glyphs
}

fn simple(contours: &[&[(i16, i16, bool)]]) -> SimpleGlyph {
    let mut glyph = SimpleGlyph {
        bbox: Bbox::default(),
        contours: contours
            .iter()
            .map(|points| {
                Contour::from(
                    points
                        .iter()
                        .map(|&(x, y, on_curve)| CurvePoint::new(x, y, on_curve))
                        .collect::<Vec<_>>(),
                )
            })
            .collect(),
        instructions: Vec::new(),
    };
    glyph.recompute_bounding_box();
    glyph
}

// bounding boxes of composites are not read by the converter
fn composite(components: &[(u16, Anchor)]) -> CompositeGlyph {
    let mut iter = components.iter().map(|(gid, anchor)| {
        Component::new(
            GlyphId16::new(*gid),
            *anchor,
            Transform::default(),
            ComponentFlags::default(),
        )
    });
    let first = iter.next().expect("at least one component");
    let mut glyph = CompositeGlyph::new(first, square_bbox());
    for component in iter {
        glyph.add_component(component, square_bbox());
    }
    glyph
}

fn square_bbox() -> Bbox {
    Bbox {
        x_min: 100,
        y_min: 0,
        x_max: 600,
        y_max: 700,
    }
}

#[derive(Default)]
struct BeWriter(Vec<u8>);

impl BeWriter {
    fn u16(&mut self, value: u16) -> &mut Self {
        self.0.extend_from_slice(&value.to_be_bytes());
        self
    }

    fn i16(&mut self, value: i16) -> &mut Self {
        self.0.extend_from_slice(&value.to_be_bytes());
        self
    }

    fn u32(&mut self, value: u32) -> &mut Self {
        self.0.extend_from_slice(&value.to_be_bytes());
        self
    }

    fn zeros(&mut self, count: usize) -> &mut Self {
        self.0.resize(self.0.len() + count, 0);
        self
    }

    fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.0)
    }
}

fn head(index_to_loc_format: i16) -> Vec<u8> {
    BeWriter::default()
        .u32(0x0001_0000) // version
        .u32(0x0001_0000) // fontRevision
        .u32(0) // checksumAdjustment
        .u32(0x5F0F_3CF5) // magicNumber
        .u16(0) // flags
        .u16(UNITS_PER_EM)
        .zeros(16) // created, modified
        .i16(0) // xMin
        .i16(TYPO_DESCENDER)
        .i16(1700)
        .i16(1400)
        .u16(0) // macStyle
        .u16(8) // lowestRecPPEM
        .i16(2) // fontDirectionHint
        .i16(index_to_loc_format)
        .i16(0) // glyphDataFormat
        .finish()
}

fn maxp() -> Vec<u8> {
    BeWriter::default()
        .u32(0x0000_5000)
        .u16(NUM_GLYPHS)
        .finish()
}

fn hhea() -> Vec<u8> {
    BeWriter::default()
        .u32(0x0001_0000)
        .i16(TYPO_ASCENDER)
        .i16(TYPO_DESCENDER)
        .i16(TYPO_LINE_GAP)
        .u16(1700) // advanceWidthMax
        .zeros(6) // minLSB, minRSB, xMaxExtent
        .i16(1) // caretSlopeRise
        .zeros(4) // caretSlopeRun, caretOffset
        .zeros(8) // reserved
        .i16(0) // metricDataFormat
        .u16(NUM_GLYPHS)
        .finish()
}

fn hmtx() -> Vec<u8> {
    let mut writer = BeWriter::default();
    for gid in 0..NUM_GLYPHS {
        writer.u16(advance(gid)).i16(0);
    }
    writer.finish()
}

// version 0, which ends after usWinDescent
fn os2() -> Vec<u8> {
    BeWriter::default()
        .u16(0) // version
        .i16(DEFAULT_ADVANCE as i16) // xAvgCharWidth
        .u16(400) // usWeightClass
        .u16(5) // usWidthClass
        .zeros(2 + 2 * 10 + 2) // fsType, sub/superscript, strikeout, sFamilyClass
        .zeros(10) // panose
        .zeros(16) // ulUnicodeRange1-4
        .zeros(4) // achVendID
        .u16(0x40) // fsSelection REGULAR
        .u16(0x0020) // usFirstCharIndex
        .u16(0xFFFF) // usLastCharIndex
        .i16(TYPO_ASCENDER)
        .i16(TYPO_DESCENDER)
        .i16(TYPO_LINE_GAP)
        .u16(1000) // usWinAscent
        .u16(300) // usWinDescent
        .finish()
}
