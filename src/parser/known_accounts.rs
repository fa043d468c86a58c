//! Well-known Solana account ids that can never be a pool account.

/// Wrapped SOL mint. Excluded from pair detection.
pub const NATIVE_MINT: &str = "So11111111111111111111111111111111111111112";

/// SPL Token program.
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// SPL Token-2022 program.
pub const TOKEN_2022_PROGRAM_ID: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";

/// System program.
pub const SYSTEM_PROGRAM_ID: &str = "11111111111111111111111111111111";

/// Associated Token Account program.
pub const ASSOCIATED_TOKEN_PROGRAM_ID: &str = "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL";

/// Raydium AMM v4 program.
pub const RAYDIUM_AMM_V4_PROGRAM_ID: &str = "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8";

/// Compute Budget program.
pub const COMPUTE_BUDGET_PROGRAM_ID: &str = "ComputeBudget111111111111111111111111111111";

/// Rent sysvar.
pub const SYSVAR_RENT_ID: &str = "SysvarRent111111111111111111111111111111111";

/// Infrastructure programs skipped during pool address elimination.
pub const INFRA_PROGRAM_IDS: [&str; 7] = [
    TOKEN_PROGRAM_ID,
    TOKEN_2022_PROGRAM_ID,
    SYSTEM_PROGRAM_ID,
    ASSOCIATED_TOKEN_PROGRAM_ID,
    RAYDIUM_AMM_V4_PROGRAM_ID,
    COMPUTE_BUDGET_PROGRAM_ID,
    SYSVAR_RENT_ID,
];

/// Returns `true` for the native mint and every infrastructure program.
#[must_use]
pub fn is_well_known(account: &str) -> bool {
    account == NATIVE_MINT || INFRA_PROGRAM_IDS.contains(&account)
}
