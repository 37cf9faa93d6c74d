// ============================================================================
// BeforeAfter CLI — compose a before/after post from the command line
// ============================================================================
//
// Usage examples:
//   beforeafter --before old.jpg --after new.jpg
//   beforeafter -b old.jpg -a new.jpg -d "Kitchen refresh in 3 days" --cta "Call now" \
//               --phone 555-0100 --website acme.example -o post.png
//   beforeafter -b old.jpg -a new.jpg --use-profile --improve
//   beforeafter -b old.jpg -a new.jpg --phone 555-0100 --cta "Call us" --save-profile
//
// Everything runs synchronously on the current thread: load both photos,
// optionally rewrite the description remotely, render, write the PNG.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::improve::{ImproveConfig, TextImprover};
use crate::io::{DEFAULT_OUTPUT, export_png, load_image};
use crate::ops::color::{DEFAULT_BRAND_COLOR, parse_hex_color};
use crate::ops::compose::{ImageSlot, Renderer};
use crate::ops::layout::RenderStyle;
use crate::ops::text::{FixedAdvanceFace, GlyphFace, TextStyle, Typeface};
use crate::profile::Profile;
use crate::session::{ContactKind, Session};
use crate::{log_err, log_info, log_warn};

/// Environment variable that overrides the profile's API key.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// Before/after social media post composer.
#[derive(Parser, Debug)]
#[command(
    name = "beforeafter",
    about = "Compose a before/after marketing image and export it as PNG",
    long_about = "Place two photos side by side under a brand-colored header, with an\n\
                  optional description, call-to-action button and contact details,\n\
                  and write the result as a PNG.\n\n\
                  Example:\n  \
                  beforeafter -b old.jpg -a new.jpg -d \"Fresh paint, new floors\" --cta \"Call now\""
)]
pub struct CliArgs {
    /// The "before" photo. RAW camera files are accepted.
    #[arg(short, long, value_name = "FILE")]
    pub before: PathBuf,

    /// The "after" photo.
    #[arg(short, long, value_name = "FILE")]
    pub after: PathBuf,

    /// Output PNG path.
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Brand color for the header band and CTA button (#rrggbb or #rgb).
    #[arg(short, long, value_name = "HEX", default_value = DEFAULT_BRAND_COLOR)]
    pub color: String,

    /// Post description, word-wrapped under the photos.
    #[arg(short, long, value_name = "TEXT", conflicts_with = "description_file")]
    pub description: Option<String>,

    /// Read the description from a text file.
    #[arg(long, value_name = "FILE")]
    pub description_file: Option<PathBuf>,

    /// Call-to-action button label (drawn upper-cased).
    #[arg(long, value_name = "LABEL")]
    pub cta: Option<String>,

    /// Phone number contact line.
    #[arg(long, value_name = "NUMBER")]
    pub phone: Option<String>,

    /// Email contact line.
    #[arg(long, value_name = "ADDRESS")]
    pub email: Option<String>,

    /// Website contact line.
    #[arg(long, value_name = "URL")]
    pub website: Option<String>,

    /// Business or owner name stored with --save-profile.
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Fill empty contact fields and the CTA label from the saved profile.
    #[arg(long)]
    pub use_profile: bool,

    /// Store the given name, contact details, CTA label and API key in the profile.
    #[arg(long)]
    pub save_profile: bool,

    /// Profile file to use instead of the platform default.
    #[arg(long, value_name = "FILE")]
    pub profile: Option<PathBuf>,

    /// Use "Tel:"/"Email:"/"Web:" instead of emoji icons.
    #[arg(long)]
    pub plain_icons: bool,

    /// System font family for all text.
    #[arg(long, value_name = "FAMILY", conflicts_with = "font_file")]
    pub font: Option<String>,

    /// TTF/OTF font file for all text.
    #[arg(long, value_name = "FILE")]
    pub font_file: Option<PathBuf>,

    /// Rewrite the description with the remote text-improvement service first.
    #[arg(long)]
    pub improve: bool,

    /// API key for --improve (default: $ANTHROPIC_API_KEY, then the profile).
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// CTA label font size in pixels.
    #[arg(long, value_name = "PX")]
    pub cta_font_size: Option<f32>,

    /// Contact line font size in pixels.
    #[arg(long, value_name = "PX")]
    pub contact_font_size: Option<f32>,

    /// Vertical distance between contact lines in pixels.
    #[arg(long, value_name = "PX")]
    pub contact_spacing: Option<u32>,

    /// Print the layout and timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run one composition and return an OS exit code.
pub fn run(args: CliArgs) -> ExitCode {
    let start = Instant::now();
    match run_inner(&args) {
        Ok(()) => {
            println!("Saved {}", args.output.display());
            if args.verbose {
                println!("  ({:.0}ms)", start.elapsed().as_secs_f64() * 1000.0);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log_err!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_inner(args: &CliArgs) -> Result<(), String> {
    let profile_path = args.profile.clone().or_else(Profile::default_path);
    let mut profile = match &profile_path {
        Some(path) => Profile::load_from(path),
        None => Profile::default(),
    };

    // -- Step 1: Session from flags (+ profile) ------------------------------
    let mut session = build_session(args, &profile)?;

    if args.save_profile {
        update_profile(&mut profile, args);
        let path = profile_path
            .as_deref()
            .ok_or_else(|| "no profile location available; pass --profile".to_string())?;
        profile
            .save_to(path)
            .map_err(|e| format!("could not save profile '{}': {}", path.display(), e))?;
        log_info!("Profile saved to {}", path.display());
        if args.verbose {
            println!("  profile saved to {}", path.display());
        }
    }

    // -- Step 2: Load photos -------------------------------------------------
    for (slot, path) in [(ImageSlot::Before, &args.before), (ImageSlot::After, &args.after)] {
        let img = load_image(path)
            .map_err(|e| format!("could not load {} image '{}': {}", slot.name(), path.display(), e))?;
        session.set_image(slot, img);
    }

    // -- Step 3: Improve the description (optional) --------------------------
    if args.improve {
        let key = resolve_api_key(args.api_key.as_deref(), std::env::var(API_KEY_ENV).ok(), &profile);
        let improver = TextImprover::new(&key, ImproveConfig::default())
            .map_err(|e| e.user_message())?;
        match improver.improve(&session.description) {
            Ok(text) => {
                if args.verbose {
                    println!("  improved description: {}", text);
                }
                session.description = text;
            }
            Err(e) => return Err(e.user_message()),
        }
    }

    // -- Step 4: Render + export ---------------------------------------------
    let style = build_style(args);
    let input = session.render_input();
    let canvas = match load_face(args) {
        Ok(face) => render_with(face, style, &input, args.verbose)?,
        Err(e) => {
            log_warn!("No outline font available ({}); using block glyphs", e);
            eprintln!("warning: {}; text will be drawn as blocks", e);
            render_with(FixedAdvanceFace::default(), style, &input, args.verbose)?
        }
    };

    export_png(&canvas, &args.output)
        .map_err(|e| format!("could not write '{}': {}", args.output.display(), e))
}

fn render_with<T: Typeface>(
    face: T,
    style: RenderStyle,
    input: &crate::ops::compose::RenderInput,
    verbose: bool,
) -> Result<image::RgbaImage, String> {
    let renderer = Renderer::new(face, style);
    if verbose {
        let layout = renderer.layout(input).map_err(|e| e.to_string())?;
        println!(
            "  canvas {}x{}, {} description line(s), cta: {}, {} contact(s)",
            layout.width,
            layout.height,
            layout.description.len(),
            layout.cta_button.is_some(),
            layout.contacts.len()
        );
    }
    renderer.render(input).map_err(|e| e.to_string())
}

// ============================================================================
// Helpers
// ============================================================================

fn build_session(args: &CliArgs, profile: &Profile) -> Result<Session, String> {
    let mut session = Session::new();
    session.brand_color = parse_hex_color(&args.color).map_err(|e| e.to_string())?;

    session.description = match (&args.description, &args.description_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .map_err(|e| format!("could not read description '{}': {}", path.display(), e))?,
        (None, None) => String::new(),
    };
    session.cta_label = args.cta.clone().unwrap_or_default();

    session.contacts.plain_icons = args.plain_icons;
    for (kind, value) in contact_args(args) {
        if let Some(v) = value {
            session.contacts.set(kind, v);
        }
    }

    if args.use_profile {
        session.apply_profile(profile);
    }
    Ok(session)
}

fn contact_args(args: &CliArgs) -> [(ContactKind, Option<&str>); 3] {
    [
        (ContactKind::Phone, args.phone.as_deref()),
        (ContactKind::Email, args.email.as_deref()),
        (ContactKind::Website, args.website.as_deref()),
    ]
}

/// Copy every non-empty flag into the profile.
fn update_profile(profile: &mut Profile, args: &CliArgs) {
    fn put(slot: &mut String, value: Option<&str>) {
        if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
            *slot = v.to_string();
        }
    }
    put(&mut profile.name, args.name.as_deref());
    put(&mut profile.phone, args.phone.as_deref());
    put(&mut profile.email, args.email.as_deref());
    put(&mut profile.website, args.website.as_deref());
    put(&mut profile.cta, args.cta.as_deref());
    put(&mut profile.api_key, args.api_key.as_deref());
}

/// `--api-key` beats the environment, which beats the profile.
fn resolve_api_key(flag: Option<&str>, env: Option<String>, profile: &Profile) -> String {
    flag.map(str::to_string)
        .or(env)
        .filter(|k| !k.trim().is_empty())
        .unwrap_or_else(|| profile.api_key.clone())
}

fn build_style(args: &CliArgs) -> RenderStyle {
    let mut style = RenderStyle::default();
    if let Some(size) = args.cta_font_size.filter(|s| *s > 0.0) {
        style.cta_text = TextStyle { size, ..style.cta_text };
    }
    if let Some(size) = args.contact_font_size.filter(|s| *s > 0.0) {
        style.contact = TextStyle { size, ..style.contact };
    }
    if let Some(spacing) = args.contact_spacing.filter(|s| *s > 0) {
        style.contact_spacing = spacing;
    }
    style
}

fn load_face(args: &CliArgs) -> Result<GlyphFace, String> {
    let face = if let Some(path) = &args.font_file {
        GlyphFace::from_file(path)
    } else if let Some(family) = &args.font {
        GlyphFace::system(family)
    } else {
        GlyphFace::default_system()
    };
    face.map_err(|e| font_error_context(args.font_file.as_deref(), e))
}

fn font_error_context(path: Option<&Path>, e: crate::ops::text::FontError) -> String {
    match path {
        Some(p) => format!("font '{}': {}", p.display(), e),
        None => e.to_string(),
    }
}
