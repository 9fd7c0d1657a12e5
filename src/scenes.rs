//! Scene data download and extraction.
//!
//! The test scenes reference meshes that are far too large to keep in the
//! repository. Each manifest entry pins a URL to a SHA-256 digest; a download
//! is only trusted once its digest matches, and a mismatch aborts loudly
//! rather than extracting stale or corrupt data.

use anyhow::{Context, Result, bail};
use flate2::read::GzDecoder;
use indicatif::{ProgressBar, ProgressStyle};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Read};
use std::path::Path;

struct SceneFile {
    url: &'static str,
    sha256: &'static str,
    dest_dir: &'static str,
    /// Extract only this archive member instead of the whole archive.
    archive_member: Option<&'static str>,
}

const SCENE_FILES: &[SceneFile] = &[
    SceneFile {
        url: "http://graphics.stanford.edu/pub/3Dscanrep/bunny.tar.gz",
        sha256: "a5720bd96d158df403d153381b8411a727a1d73cff2f33dc9b212d6f75455b84",
        dest_dir: "stanford",
        archive_member: Some("bunny/reconstruction/bun_zipper.ply"),
    },
    SceneFile {
        url: "http://graphics.stanford.edu/pub/3Dscanrep/dragon/dragon_recon.tar.gz",
        sha256: "74ac1d90989c9b1732edee82d57e9ce71452144cf4355f108d8c9c616d28d02f",
        dest_dir: "stanford",
        archive_member: Some("dragon_recon/dragon_vrip.ply"),
    },
    SceneFile {
        url: "http://graphics.stanford.edu/pub/3Dscanrep/happy/happy_recon.tar.gz",
        sha256: "409cd294efbfd8244e15a382b95a9423f153b7776e736c9b09f19ec9d3c10ed0",
        dest_dir: "stanford",
        archive_member: Some("happy_recon/happy_vrip.ply"),
    },
    SceneFile {
        url: "http://graphics.stanford.edu/data/3Dscanrep/lucy.tar.gz",
        sha256: "c4beb1f7bfa965643bbbf889bd1849a4b4b955e95c731941be61e6edac65616a",
        dest_dir: "stanford",
        archive_member: None,
    },
    SceneFile {
        url: "http://graphics.stanford.edu/data/3Dscanrep/xyzrgb/xyzrgb_dragon.ply.gz",
        sha256: "8aa449f1966cbb50e5896ecc32cf57ab5f0cdfd3c3e37d3e6f60b948997da5c1",
        dest_dir: "stanford",
        archive_member: None,
    },
    SceneFile {
        url: "http://graphics.stanford.edu/data/3Dscanrep/xyzrgb/xyzrgb_statuette.ply.gz",
        sha256: "1d867b6540c02935caa777bd6746429a62d4a5d23f11c9bfdfebbaa90c05ca8b",
        dest_dir: "stanford",
        archive_member: None,
    },
];

/// Download (when needed), verify and extract every manifest entry.
pub fn download_scene_data(download_dir: &Path, scenes_dir: &Path) -> Result<()> {
    for file in SCENE_FILES {
        download_and_extract(file, download_dir, scenes_dir)?;
    }
    Ok(())
}

fn download_and_extract(file: &SceneFile, download_dir: &Path, scenes_dir: &Path) -> Result<()> {
    let basename = file.url.rsplit('/').next().unwrap_or(file.url);
    let archive_path = download_dir.join(file.dest_dir).join(basename);

    let up_to_date = archive_path.exists() && hash_file(&archive_path)? == file.sha256;
    if !up_to_date {
        download(file.url, &archive_path)?;

        let digest = hash_file(&archive_path)?;
        if digest != file.sha256 {
            bail!(
                "{} hash mismatch ({}, expected {})",
                file.url,
                digest,
                file.sha256
            );
        }
    }

    extract(
        &archive_path,
        &scenes_dir.join(file.dest_dir),
        file.archive_member,
    )
}

fn hash_file(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path)
        .with_context(|| format!("failed to open {} for hashing", path.display()))?;

    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

fn download(url: &str, dest_path: &Path) -> Result<()> {
    if let Some(parent) = dest_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let agent = ureq::agent();
    let response = agent
        .get(url)
        .call()
        .with_context(|| format!("failed to download {}", url))?;

    if response.status() != 200 {
        bail!("failed to download {}: HTTP {}", url, response.status());
    }

    let total = response
        .headers()
        .get("content-length")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok());

    let pb = match total {
        Some(length) => ProgressBar::new(length),
        None => ProgressBar::no_length(),
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb.set_message(url.to_string());

    let body = response.into_body();
    let mut reader = pb.wrap_read(body.into_reader());
    let mut dest = fs::File::create(dest_path)?;
    io::copy(&mut reader, &mut dest)?;
    pb.finish_and_clear();

    Ok(())
}

fn extract(archive_path: &Path, dest_dir: &Path, member: Option<&str>) -> Result<()> {
    fs::create_dir_all(dest_dir)?;

    let name = archive_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        extract_tar_gz(archive_path, dest_dir, member)
    } else if name.ends_with(".zip") {
        extract_zip(archive_path, dest_dir, member)
    } else if name.ends_with(".gz") {
        // A plain gzip-compressed file; .tar.gz was handled above.
        extract_gz(archive_path, dest_dir)
    } else {
        bail!("extraction of {} not supported", archive_path.display());
    }
}

fn extract_tar_gz(archive_path: &Path, dest_dir: &Path, member: Option<&str>) -> Result<()> {
    let file = fs::File::open(archive_path)?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));

    match member {
        Some(member) => {
            for entry in archive.entries()? {
                let mut entry = entry?;
                if entry.path()?.as_ref() == Path::new(member) {
                    entry.unpack_in(dest_dir)?;
                    return Ok(());
                }
            }
            bail!("{} not found in {}", member, archive_path.display());
        }
        None => {
            archive.unpack(dest_dir)?;
            Ok(())
        }
    }
}

fn extract_zip(archive_path: &Path, dest_dir: &Path, member: Option<&str>) -> Result<()> {
    let mut archive = zip::ZipArchive::new(fs::File::open(archive_path)?)?;

    match member {
        Some(member) => {
            let mut entry = archive
                .by_name(member)
                .with_context(|| format!("{} not found in {}", member, archive_path.display()))?;
            let dest_path = dest_dir.join(member);
            if let Some(parent) = dest_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut dest = fs::File::create(&dest_path)?;
            io::copy(&mut entry, &mut dest)?;
        }
        None => archive.extract(dest_dir)?,
    }

    Ok(())
}

fn extract_gz(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let stem = archive_path
        .file_stem()
        .context("archive has no file name")?;
    let mut decoder = GzDecoder::new(fs::File::open(archive_path)?);
    let mut dest = fs::File::create(dest_dir.join(stem))?;
    io::copy(&mut decoder, &mut dest)?;
    Ok(())
}
