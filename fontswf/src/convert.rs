//! The conversion driver.

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use skrifa::{
    raw::{types::GlyphId, FontRef},
    MetadataProvider,
};
use swf_codec::{Container, Tag, TagCode};

use crate::{
    define_font::{FontIdentity, FontTable},
    glyph::{GlyphConverter, GlyphRecord},
    metrics::{Advances, FontMetrics},
    outline::OutlineReader,
    ConvertError, ConvertOptions, GlyphError, Progress,
};

/// The most glyphs a DefineFont3 tag can hold.
const MAX_GLYPHS: usize = u16::MAX as usize;

/// Replace a font definition in `reference` with the outlines of `font_data`.
///
/// The DefineFont3 tag selected by [`ConvertOptions::font_id`], and the
/// DefineFontAlignZones tags for the same font, are rebuilt from the
/// TrueType font; all other tags are copied unchanged. A container may define
/// several fonts, and text elsewhere in it still refers to the ones that are
/// not selected, so their DefineFont3 and DefineFontAlignZones tags are left
/// alone. The result is always an uncompressed container.
///
/// Glyphs that fail to convert are written blank and reported to `progress`;
/// only problems with the inputs as a whole are returned as errors.
pub fn convert_font(
    font_data: &[u8],
    reference: &[u8],
    options: &ConvertOptions,
    mut progress: Option<&mut dyn Progress>,
) -> Result<Vec<u8>, ConvertError> {
    let mut report = |message: String| {
        if let Some(progress) = progress.as_deref_mut() {
            progress.report(&message);
        }
    };

    let container = Container::parse(reference)?;
    log::info!(
        "reference container: version {}, {} tags",
        container.version,
        container.tags.len()
    );
    let target = find_define_font3(&container, options.font_id)?;
    let target_id = font_id_of(target).ok_or(ConvertError::MissingFontDefinition)?;
    let identity = resolve_identity(target, target_id, options);
    log::info!(
        "replacing font {} '{}'",
        identity.font_id,
        identity.name.escape_debug()
    );

    let font = FontRef::new(font_data)
        .map_err(|e| ConvertError::UnsupportedFontFormat(format!("not an OpenType font: {e}")))?;
    let outlines = OutlineReader::new(&font)
        .map_err(|e| ConvertError::UnsupportedFontFormat(format!("no TrueType outlines: {e}")))?;
    let metrics = FontMetrics::new(&font, options.em_square)?;
    let advances = Advances::new(&font, metrics.units_per_em);

    let mut charmap = BTreeMap::new();
    for (code, gid) in font.charmap().mappings() {
        charmap.entry(code).or_insert(gid);
    }
    if charmap.is_empty() {
        return Err(ConvertError::MissingCharacterMap);
    }
    let codes = code_points(&charmap, &options.control_chars);
    let controls: BTreeSet<u32> = options.control_chars.iter().copied().collect();
    report(format!("converting {} glyphs", codes.len()));

    let converter = GlyphConverter::new(outlines, &advances, &metrics);
    let convert_one = |code: &u32| -> (u32, Result<GlyphRecord, GlyphError>) {
        let code = *code;
        let record = match charmap.get(&code) {
            Some(gid) if !controls.contains(&code) => converter.convert(code, *gid),
            _ => Ok(GlyphRecord::empty(code)),
        };
        (code, record)
    };

    let mut table = FontTable::with_capacity(codes.len());
    let mut failures = 0;
    for batch in codes.chunks(options.checkpoint_interval.max(1)) {
        let results: Vec<_> = if options.parallel {
            batch.par_iter().map(convert_one).collect()
        } else {
            batch.iter().map(convert_one).collect()
        };
        for (code, result) in results {
            let record = result.unwrap_or_else(|e| {
                failures += 1;
                log::warn!("U+{code:04X}: {e}");
                report(format!("glyph U+{code:04X} failed: {e}"));
                GlyphRecord::empty(code)
            });
            table.push(record);
        }
        report(format!("{}/{} glyphs converted", table.len(), codes.len()));
    }
    log::info!("{} glyphs converted, {failures} failed", table.len());

    let define_font3 = table.define_font3(&identity, &metrics)?;
    let align_zones = table.align_zones(identity.font_id, options.csm_hint);
    let mut zones_replaced = 0;
    let output = container.rebuild(|tag| {
        if std::ptr::eq(tag, target) {
            Some(define_font3.clone())
        } else if tag.code == TagCode::DEFINE_FONT_ALIGN_ZONES
            && font_id_of(tag) == Some(target_id)
        {
            zones_replaced += 1;
            Some(align_zones.clone())
        } else {
            None
        }
    })?;
    if zones_replaced == 0 {
        log::warn!("no DefineFontAlignZones tag for font {target_id}");
    }
    report(format!(
        "wrote {} byte font definition, {} byte container",
        define_font3.len(),
        output.len()
    ));
    Ok(output)
}

fn font_id_of(tag: &Tag) -> Option<u16> {
    match tag.data.get(..2)? {
        [lo, hi] => Some(u16::from_le_bytes([*lo, *hi])),
        _ => None,
    }
}

fn find_define_font3(container: &Container, font_id: Option<u16>) -> Result<&Tag, ConvertError> {
    let mut fonts = container.tags_with_code(TagCode::DEFINE_FONT3);
    match font_id {
        Some(id) => fonts.find(|tag| font_id_of(tag) == Some(id)),
        None => fonts.next(),
    }
    .ok_or(ConvertError::MissingFontDefinition)
}

fn resolve_identity(target: &Tag, font_id: u16, options: &ConvertOptions) -> FontIdentity {
    let mut identity = FontIdentity::from_define_font3(&target.data).unwrap_or_else(|| {
        log::warn!("cannot read name of font {font_id}, using defaults");
        FontIdentity::fallback(font_id)
    });
    if let Some(name) = &options.font_name {
        identity.name = name.clone();
    }
    if let Some(language_code) = options.language_code {
        identity.language_code = language_code;
    }
    identity
}

/// The mapped code points and the control characters, in ascending order.
fn code_points(charmap: &BTreeMap<u32, GlyphId>, control_chars: &[u32]) -> Vec<u32> {
    let mut codes: BTreeSet<u32> = charmap.keys().copied().collect();
    codes.extend(control_chars.iter().copied());
    if codes.len() > MAX_GLYPHS {
        log::warn!(
            "{} code points do not fit one font, keeping the first {MAX_GLYPHS}",
            codes.len()
        );
    }
    codes.into_iter().take(MAX_GLYPHS).collect()
}
