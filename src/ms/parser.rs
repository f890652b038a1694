use std::fmt;
use std::io::{self, BufRead};

use thiserror::Error;
use tracing::{debug, trace};

use super::tokenizer::MsTokenizer;
use super::types::{Replicate, SimulationHeader};
use crate::buffer::{AllocationError, SiteBuffers};

/// Point in the record grammar where parsing failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStage {
    /// Command line and seed line at the top of the stream.
    Header,
    /// Lines before a replicate's `//` delimiter.
    Delimiter,
    /// `segsites: N` line.
    Segsites,
    /// Optional `prob:`-style marker before the positions.
    Marker,
    /// Site position list.
    Positions,
    /// Per-individual allele strings.
    Haplotypes,
}

impl fmt::Display for ParseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParseStage::Header => "header",
            ParseStage::Delimiter => "delimiter",
            ParseStage::Segsites => "segsites",
            ParseStage::Marker => "marker",
            ParseStage::Positions => "positions",
            ParseStage::Haplotypes => "haplotypes",
        };
        f.write_str(name)
    }
}

/// Input deviated from the expected `ms` grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed input at {stage} (replicate {replicate}, line {line}): {reason}")]
pub struct MalformedRecordError {
    /// Grammar stage being parsed.
    pub stage: ParseStage,
    /// 1-based replicate number, 0 while reading the header.
    pub replicate: usize,
    /// 1-based input line number.
    pub line: usize,
    /// What was wrong.
    pub reason: String,
}

/// Errors raised while reading `ms` output.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Input did not follow the record grammar.
    #[error(transparent)]
    Malformed(#[from] MalformedRecordError),
    /// Site buffers could not be grown for a large replicate.
    #[error(transparent)]
    Allocation(#[from] AllocationError),
    /// Site buffers hold fewer haplotypes than the header's sample size.
    #[error("site buffers hold {found} haplotypes but the input samples {expected}")]
    BufferMismatch {
        /// Sample size from the header
        expected: usize,
        /// Haplotype buffers available
        found: usize,
    },
    /// Reading the input stream failed.
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
}

/// Streaming parser producing one [`Replicate`] at a time.
#[derive(Debug)]
pub struct RecordParser<R> {
    tokens: MsTokenizer<R>,
    header: SimulationHeader,
    replicates_read: usize,
}

impl<R: BufRead> RecordParser<R> {
    /// Read the two header lines and prepare for the first replicate.
    pub fn new(reader: R) -> Result<Self, ParseError> {
        let mut tokens = MsTokenizer::new(reader);
        let header = read_header(&mut tokens)?;
        debug!(
            program = %header.program,
            nsam = header.nsam,
            ms_datasets = header.ms_datasets,
            "read ms header"
        );
        Ok(Self {
            tokens,
            header,
            replicates_read: 0,
        })
    }

    /// Header read at construction.
    pub fn header(&self) -> &SimulationHeader {
        &self.header
    }

    /// Number of replicates returned so far.
    pub fn replicates_read(&self) -> usize {
        self.replicates_read
    }

    /// Parse the next replicate into `buffers`.
    ///
    /// Returns `Ok(None)` when the input ends while looking for the next
    /// `//` delimiter. Running out of input anywhere inside a record is an
    /// error, as is passing buffers with fewer haplotypes than the header's
    /// sample size.
    pub fn read_next_replicate<'b>(
        &mut self,
        buffers: &'b mut SiteBuffers,
    ) -> Result<Option<Replicate<'b>>, ParseError> {
        if buffers.individuals() < self.header.nsam {
            return Err(ParseError::BufferMismatch {
                expected: self.header.nsam,
                found: buffers.individuals(),
            });
        }
        let replicate = self.replicates_read + 1;

        loop {
            let line = self.tokens.line_number() + 1;
            match self.tokens.next_line() {
                Ok(None) => return Ok(None),
                Ok(Some(text)) if text.starts_with('/') => break,
                Ok(Some(_)) => {}
                Err(err) => return Err(read_failure(err, ParseStage::Delimiter, replicate, line)),
            }
        }

        let mut cursor = Cursor {
            tokens: &mut self.tokens,
            replicate,
        };

        let label = cursor.expect(ParseStage::Segsites)?;
        if label != "segsites:" {
            let reason = format!("expected 'segsites:', found '{}'", label);
            return Err(cursor.malformed(ParseStage::Segsites, reason).into());
        }
        let segsites: usize = cursor.parse(ParseStage::Segsites, "site count")?;

        buffers.ensure_capacity(segsites)?;
        buffers.reset();

        if segsites > 0 {
            let label = cursor.expect(ParseStage::Marker)?;
            if label.as_bytes().get(1) == Some(&b'r') {
                let prob: f64 = cursor.parse(ParseStage::Marker, "marker value")?;
                cursor.expect(ParseStage::Marker)?;
                trace!(replicate, prob, "skipped marker line");
            }

            for _ in 0..segsites {
                let position: f64 = cursor.parse(ParseStage::Positions, "site position")?;
                buffers.push_position(position);
            }

            for individual in 0..self.header.nsam {
                let alleles = cursor.expect(ParseStage::Haplotypes)?;
                if alleles.len() != segsites {
                    let reason = format!(
                        "haplotype {} has {} alleles, expected {}",
                        individual + 1,
                        alleles.len(),
                        segsites
                    );
                    return Err(cursor.malformed(ParseStage::Haplotypes, reason).into());
                }

                if let Some(site) = alleles.bytes().position(|b| b != b'0' && b != b'1') {
                    let reason = format!(
                        "haplotype {} has allele '{}' at site {}",
                        individual + 1,
                        alleles.as_bytes()[site] as char,
                        site + 1
                    );
                    return Err(cursor.malformed(ParseStage::Haplotypes, reason).into());
                }

                buffers
                    .haplotype_mut(individual)
                    .extend(alleles.bytes().map(|allele| allele == b'1'));
            }
        }

        buffers.record_sites(segsites);
        self.replicates_read = replicate;
        debug!(replicate, segsites, "parsed replicate");

        Ok(Some(Replicate::new(buffers.positions(), buffers.haplotypes())))
    }
}

/// Token access bound to the replicate being parsed, for error reporting.
struct Cursor<'t, R> {
    tokens: &'t mut MsTokenizer<R>,
    replicate: usize,
}

impl<R: BufRead> Cursor<'_, R> {
    fn expect(&mut self, stage: ParseStage) -> Result<&str, ParseError> {
        let available = match self.tokens.skip_to_token() {
            Ok(available) => available,
            Err(err) => {
                let line = self.tokens.line_number() + 1;
                return Err(read_failure(err, stage, self.replicate, line));
            }
        };
        if !available {
            let reason = "unexpected end of input".to_string();
            return Err(self.malformed(stage, reason).into());
        }
        let replicate = self.replicate;
        let line = self.tokens.line_number();
        self.tokens.take_token().ok_or_else(|| {
            MalformedRecordError {
                stage,
                replicate,
                line,
                reason: "unexpected end of input".to_string(),
            }
            .into()
        })
    }

    fn parse<T: std::str::FromStr>(
        &mut self,
        stage: ParseStage,
        what: &str,
    ) -> Result<T, ParseError> {
        let token = self.expect(stage)?;
        match token.parse() {
            Ok(value) => Ok(value),
            Err(_) => {
                let reason = format!("invalid {} '{}'", what, token);
                Err(self.malformed(stage, reason).into())
            }
        }
    }

    fn malformed(&self, stage: ParseStage, reason: String) -> MalformedRecordError {
        MalformedRecordError {
            stage,
            replicate: self.replicate,
            line: self.tokens.line_number(),
            reason,
        }
    }
}

/// Undecodable input is a grammar violation; other read failures stay I/O errors.
fn read_failure(err: io::Error, stage: ParseStage, replicate: usize, line: usize) -> ParseError {
    if err.kind() == io::ErrorKind::InvalidData {
        MalformedRecordError {
            stage,
            replicate,
            line,
            reason: "input is not valid UTF-8".to_string(),
        }
        .into()
    } else {
        ParseError::Io(err)
    }
}

fn read_header<R: BufRead>(tokens: &mut MsTokenizer<R>) -> Result<SimulationHeader, ParseError> {
    let malformed = |line: usize, reason: String| MalformedRecordError {
        stage: ParseStage::Header,
        replicate: 0,
        line,
        reason,
    };

    let command = tokens
        .next_line()
        .map_err(|err| read_failure(err, ParseStage::Header, 0, 1))?
        .ok_or_else(|| malformed(1, "input is empty".to_string()))?;
    let mut fields = command.split_whitespace();

    let program = fields
        .next()
        .ok_or_else(|| malformed(1, "command line is blank".to_string()))?
        .to_string();
    let nsam = match fields.next().map(str::parse::<usize>) {
        Some(Ok(nsam)) if nsam > 0 => nsam,
        Some(Ok(_)) => return Err(malformed(1, "sample size must be positive".to_string()).into()),
        _ => return Err(malformed(1, "missing or invalid sample size".to_string()).into()),
    };
    let ms_datasets = match fields.next().map(str::parse::<usize>) {
        Some(Ok(count)) => count,
        _ => return Err(malformed(1, "missing or invalid replicate count".to_string()).into()),
    };

    let seed_line = tokens
        .next_line()
        .map_err(|err| read_failure(err, ParseStage::Header, 0, 2))?;
    if seed_line.is_none() {
        return Err(malformed(2, "missing seed line".to_string()).into());
    }

    Ok(SimulationHeader {
        program,
        nsam,
        ms_datasets,
    })
}
