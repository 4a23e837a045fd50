//! csv2json - CSV TO JSON CONVERTER
//!
//! 메인 엔트리포인트

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use csv2json::{
    batch::{collect_csv_files, plan_jobs, run_batch, ConversionJob},
    cli::Args,
    converter::{convert_file, ConversionResult, ConvertOptions},
    pattern::FileFilter,
    stats::Statistics,
};

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // 스레드 풀 설정
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("스레드 풀 초기화 실패")?;
    }

    print_header(&args);

    let options = args.to_options();
    let success = if args.input.is_dir() {
        run_folder_mode(&args, &options)?
    } else {
        run_file_mode(&args, &options)?
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// 헤더 출력
fn print_header(args: &Args) {
    println!("\n{}", "═".repeat(50).bright_blue());
    println!("{}", " 🚀 CSV TO JSON CONVERTER".bright_white().bold());
    println!("{}", "═".repeat(50).bright_blue());
    println!("  {} 입력: {:?}", "📂".bright_cyan(), args.input);

    if let Some(ref output) = args.output {
        println!("  {} 출력: {:?}", "📄".bright_green(), output);
    }

    match args.delimiter {
        Some(d) => println!(
            "  {} 구분자: {}",
            "✂️".bright_yellow(),
            describe_delimiter(d)
        ),
        None => println!("  {} 구분자: 자동 감지", "✂️".bright_yellow()),
    }

    if !args.validate_only {
        println!("  {} 들여쓰기: {}", "📐".bright_white(), args.indent);
        println!("  {} 모드: {}", "⚙️".bright_yellow(), args.mode);
    }

    if let Some(ref pattern) = args.pattern {
        println!("  {} 패턴 필터: {}", "🔍".bright_magenta(), pattern);
    }

    if let Some(ref fields) = args.fields {
        println!("  {} 열 선택: {}", "🎯".bright_cyan(), fields);
    }

    if args.no_trim {
        println!("  {} {}", "🧹".bright_white(), "공백 유지".dimmed());
    }

    if args.dry_run {
        println!(
            "  {} {}",
            "⚠️".bright_yellow(),
            "드라이런 모드 (실제 변환 없음)".yellow()
        );
    }

    if args.validate_only {
        println!("  {} {}", "🔍".bright_cyan(), "유효성 검사 모드".cyan());
    }

    println!("{}", "═".repeat(50).bright_blue());
}

/// 단일 파일 변환
fn run_file_mode(args: &Args, options: &ConvertOptions) -> Result<bool> {
    let job = ConversionJob::new(args.input.clone(), args.output.clone());

    if args.dry_run {
        print_dry_run(std::slice::from_ref(&job));
        return Ok(true);
    }

    let result = convert_file(&job, options);
    report_result(&result, options.validate_only, true);

    if let Some(ref log_path) = args.log {
        let failures: Vec<&ConversionResult> =
            std::iter::once(&result).filter(|r| !r.is_success()).collect();
        write_error_log(log_path, &failures)?;
    }

    Ok(result.is_success())
}

/// 폴더 내 CSV 파일 일괄 변환
fn run_folder_mode(args: &Args, options: &ConvertOptions) -> Result<bool> {
    let filter = FileFilter::new(args.pattern.clone()).context("패턴 컴파일 실패")?;

    println!("\n{}", "📁 파일 검색 중...".bright_cyan());
    let files = collect_csv_files(&args.input, &filter, args.max_depth);

    if files.is_empty() {
        println!("{}", "⚠️ 처리할 CSV 파일이 없습니다.".yellow());
        return Ok(true);
    }

    println!(
        "  {} 발견된 파일 수: {}",
        "📋".bright_white(),
        files.len().to_string().bright_green()
    );

    let jobs = plan_jobs(&args.input, files, args.output.as_deref());

    if args.dry_run {
        print_dry_run(&jobs);
        return Ok(true);
    }

    let stats = Statistics::new(jobs.len());
    let pb = create_progress_bar(jobs.len());

    println!("\n{}", "⚡ 변환 중...".bright_cyan());

    let results = run_batch(&jobs, options, |result| {
        stats.record(result);
        pb.inc(1);
    });

    pb.finish_with_message("완료!");

    for result in &results {
        if result.is_success() && (args.verbose || result.is_empty()) {
            report_result(result, options.validate_only, args.verbose);
        }
    }

    let failures: Vec<&ConversionResult> = results.iter().filter(|r| !r.is_success()).collect();
    print_errors(&failures, args.verbose);

    if let Some(ref log_path) = args.log {
        write_error_log(log_path, &failures)?;
    }

    stats.print_summary();

    if failures.is_empty() {
        println!("\n{} 모든 파일을 변환했습니다!\n", "✅".bright_green());
    } else {
        println!(
            "\n{} {} 개의 파일을 변환하지 못했습니다.\n",
            "⚠️".bright_yellow(),
            failures.len().to_string().red()
        );
    }

    Ok(failures.is_empty())
}

/// 파일 하나의 결과 출력
fn report_result(result: &ConversionResult, validate_only: bool, detailed: bool) {
    if let Some(ref error) = result.error {
        println!(
            "\n{} 변환 실패 [{}] {:?}",
            "❌".bright_red(),
            error.kind().to_string().red(),
            result.input
        );
        println!("    {}", error.to_string().dimmed());
        return;
    }

    if result.is_empty() {
        println!(
            "\n{} 데이터 행이 없습니다: {:?} (빈 배열로 처리)",
            "⚠️".bright_yellow(),
            result.input
        );
    }

    if validate_only {
        println!(
            "\n{} 유효한 CSV: {:?}",
            "✓".green(),
            result.input
        );
    } else {
        println!(
            "\n{} 변환 완료: {:?} → {:?}",
            "✅".bright_green(),
            result.input,
            result.output
        );
    }

    if detailed {
        println!(
            "  {} 변환된 레코드 수: {}",
            "🧾".bright_white(),
            result.record_count.to_string().bright_green()
        );
        if let Some(d) = result.delimiter {
            println!("  {} 구분자: {}", "✂️".bright_yellow(), describe_delimiter(d));
        }
    }
}

/// 구분자를 사람이 읽을 수 있는 형태로
fn describe_delimiter(delimiter: u8) -> String {
    match delimiter {
        b'\t' => "탭".to_string(),
        b' ' => "공백".to_string(),
        d => format!("'{}'", d as char),
    }
}

/// 드라이런 출력
fn print_dry_run(jobs: &[ConversionJob]) {
    println!("\n{}", "📋 처리 예정 파일 목록:".bright_cyan());
    for (i, job) in jobs.iter().enumerate() {
        println!("  {}. {:?} → {:?}", i + 1, job.input, job.output);
    }
    println!(
        "\n{} 총 {} 개의 파일이 처리될 예정입니다.",
        "ℹ️".bright_blue(),
        jobs.len().to_string().bright_green()
    );
}

/// 진행률 바 생성
fn create_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    ) {
        pb.set_style(style.progress_chars("█▓▒░"));
    }
    pb
}

/// 에러 목록 출력
fn print_errors(failures: &[&ConversionResult], verbose: bool) {
    if failures.is_empty() {
        return;
    }

    println!("\n{}", "❌ 오류 발생 파일:".bright_red());
    for result in failures {
        println!(
            "  {} {:?}",
            "•".red(),
            result.input.file_name().unwrap_or_default()
        );
        if verbose {
            if let Some(ref error) = result.error {
                println!("    {}", error.to_string().dimmed());
            }
        }
    }
}

/// 에러 로그 파일 작성
fn write_error_log(log_path: &Path, failures: &[&ConversionResult]) -> Result<()> {
    let mut log_file = File::create(log_path)
        .with_context(|| format!("로그 파일을 만들 수 없습니다: {:?}", log_path))?;

    writeln!(log_file, "csv2json 에러 로그")?;
    writeln!(log_file, "생성 시간: {}", chrono_now())?;
    writeln!(log_file, "총 에러 수: {}", failures.len())?;
    writeln!(log_file, "{}", "=".repeat(50))?;

    for result in failures {
        writeln!(log_file, "\n파일: {:?}", result.input)?;
        if let Some(ref error) = result.error {
            writeln!(log_file, "분류: {}", error.kind())?;
            writeln!(log_file, "에러: {}", error)?;
        }
    }

    println!("\n{} 에러 로그 저장: {:?}", "📝".bright_cyan(), log_path);

    Ok(())
}

/// 현재 시간 문자열 반환
fn chrono_now() -> String {
    use std::time::SystemTime;
    let duration = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    format!("Unix timestamp: {}", duration.as_secs())
}
