#![allow(dead_code)]
#![allow(deprecated)]

use atomic_swap_escrow::{
    custody::escrow_authority, error::EscrowError, instruction, processor::Processor,
    state::Escrow,
};
use solana_program::program_pack::Pack;
use solana_program_test::{processor, BanksClientError, ProgramTest, ProgramTestContext};
use solana_sdk::{
    instruction::{Instruction, InstructionError},
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    system_instruction,
    transaction::{Transaction, TransactionError},
};

/// Tokens the initializer starts with.
pub const ALICE_X: u64 = 150;
/// Tokens the taker starts with.
pub const BOB_Y: u64 = 80;

pub fn program_id() -> Pubkey {
    atomic_swap_escrow::id()
}

/// ProgramTest with the escrow program and the SPL token program running as builtins.
pub fn program_test() -> ProgramTest {
    let mut program_test = ProgramTest::new(
        "atomic_swap_escrow",
        program_id(),
        processor!(Processor::process),
    );
    program_test.add_program(
        "spl_token",
        spl_token::id(),
        processor!(spl_token::processor::Processor::process),
    );
    program_test
}

/// Sends one atomic transaction paid for by the context payer.
pub async fn process(
    context: &mut ProgramTestContext,
    instructions: &[Instruction],
    signers: &[&Keypair],
) -> Result<(), BanksClientError> {
    let payer = context.payer.insecure_clone();
    let blockhash = context.banks_client.get_latest_blockhash().await?;
    let mut all_signers = Vec::with_capacity(signers.len() + 1);
    all_signers.push(&payer);
    all_signers.extend_from_slice(signers);

    let tx = Transaction::new_signed_with_payer(
        instructions,
        Some(&payer.pubkey()),
        &all_signers,
        blockhash,
    );
    context.banks_client.process_transaction(tx).await
}

pub fn assert_escrow_error(result: Result<(), BanksClientError>, expected: EscrowError) {
    assert_custom_error(result, expected as u32);
}

pub fn assert_custom_error(result: Result<(), BanksClientError>, code: u32) {
    assert_instruction_error(result, InstructionError::Custom(code));
}

pub fn assert_instruction_error(result: Result<(), BanksClientError>, expected: InstructionError) {
    let err = result.expect_err("transaction should have failed").unwrap();
    match err {
        TransactionError::InstructionError(_, actual) => {
            assert_eq!(actual, expected, "unexpected instruction error")
        }
        other => panic!("expected {:?}, got {:?}", expected, other),
    }
}

pub async fn create_mint(context: &mut ProgramTestContext, mint_authority: &Pubkey) -> Pubkey {
    let mint = Keypair::new();
    let rent = context.banks_client.get_rent().await.unwrap();
    let payer = context.payer.pubkey();

    let create_mint_ix = system_instruction::create_account(
        &payer,
        &mint.pubkey(),
        rent.minimum_balance(spl_token::state::Mint::LEN),
        spl_token::state::Mint::LEN as u64,
        &spl_token::id(),
    );
    let init_mint_ix = spl_token::instruction::initialize_mint2(
        &spl_token::id(),
        &mint.pubkey(),
        mint_authority,
        None,
        0,
    )
    .unwrap();

    process(context, &[create_mint_ix, init_mint_ix], &[&mint])
        .await
        .unwrap();
    mint.pubkey()
}

pub async fn create_token_account(
    context: &mut ProgramTestContext,
    mint: &Pubkey,
    owner: &Pubkey,
) -> Pubkey {
    let token_account = Keypair::new();
    let rent = context.banks_client.get_rent().await.unwrap();
    let payer = context.payer.pubkey();

    let create_ix = system_instruction::create_account(
        &payer,
        &token_account.pubkey(),
        rent.minimum_balance(spl_token::state::Account::LEN),
        spl_token::state::Account::LEN as u64,
        &spl_token::id(),
    );
    let init_ix = spl_token::instruction::initialize_account3(
        &spl_token::id(),
        &token_account.pubkey(),
        mint,
        owner,
    )
    .unwrap();

    process(context, &[create_ix, init_ix], &[&token_account])
        .await
        .unwrap();
    token_account.pubkey()
}

pub async fn mint_to(
    context: &mut ProgramTestContext,
    mint: &Pubkey,
    mint_authority: &Keypair,
    destination: &Pubkey,
    amount: u64,
) {
    let ix = spl_token::instruction::mint_to(
        &spl_token::id(),
        mint,
        destination,
        &mint_authority.pubkey(),
        &[],
        amount,
    )
    .unwrap();
    process(context, &[ix], &[mint_authority]).await.unwrap();
}

pub async fn token_account(
    context: &mut ProgramTestContext,
    address: &Pubkey,
) -> Option<spl_token::state::Account> {
    context
        .banks_client
        .get_account(*address)
        .await
        .unwrap()
        .map(|account| spl_token::state::Account::unpack(&account.data).unwrap())
}

pub async fn token_balance(context: &mut ProgramTestContext, address: &Pubkey) -> u64 {
    token_account(context, address)
        .await
        .expect("token account should exist")
        .amount
}

pub async fn lamports(context: &mut ProgramTestContext, address: &Pubkey) -> u64 {
    context
        .banks_client
        .get_balance(*address)
        .await
        .unwrap()
}

/// Reads the escrow record the way an outside observer would.
pub async fn read_escrow(context: &mut ProgramTestContext, address: &Pubkey) -> Option<Escrow> {
    context
        .banks_client
        .get_account(*address)
        .await
        .unwrap()
        .map(|account| Escrow::decode(&account.data).unwrap())
}

/// Two parties, two mints. Alice holds asset X, Bob holds asset Y.
pub struct SwapEnv {
    pub alice: Keypair,
    pub bob: Keypair,
    pub mint_authority: Keypair,
    pub mint_x: Pubkey,
    pub mint_y: Pubkey,
    pub alice_x: Pubkey,
    pub alice_y: Pubkey,
    pub bob_x: Pubkey,
    pub bob_y: Pubkey,
}

pub async fn setup(context: &mut ProgramTestContext) -> SwapEnv {
    let alice = Keypair::new();
    let bob = Keypair::new();
    let mint_authority = Keypair::new();
    let payer = context.payer.pubkey();

    let fund = [
        system_instruction::transfer(&payer, &alice.pubkey(), 1_000_000_000),
        system_instruction::transfer(&payer, &bob.pubkey(), 1_000_000_000),
    ];
    process(context, &fund, &[]).await.unwrap();

    let mint_x = create_mint(context, &mint_authority.pubkey()).await;
    let mint_y = create_mint(context, &mint_authority.pubkey()).await;
    let alice_x = create_token_account(context, &mint_x, &alice.pubkey()).await;
    let alice_y = create_token_account(context, &mint_y, &alice.pubkey()).await;
    let bob_x = create_token_account(context, &mint_x, &bob.pubkey()).await;
    let bob_y = create_token_account(context, &mint_y, &bob.pubkey()).await;

    mint_to(context, &mint_x, &mint_authority, &alice_x, ALICE_X).await;
    mint_to(context, &mint_y, &mint_authority, &bob_y, BOB_Y).await;

    SwapEnv {
        alice,
        bob,
        mint_authority,
        mint_x,
        mint_y,
        alice_x,
        alice_y,
        bob_x,
        bob_y,
    }
}

/// Keys of one escrow instance.
pub struct OpenEscrow {
    pub temp: Keypair,
    pub escrow: Keypair,
}

/// The initializer's bundle: create the temp account, initialize it, fund it,
/// create the escrow state account and open the escrow.
pub async fn init_escrow_instructions(
    context: &mut ProgramTestContext,
    env: &SwapEnv,
    keys: &OpenEscrow,
    deposit: u64,
    expected_amount: u64,
    escrow_space: usize,
) -> Vec<Instruction> {
    let rent = context.banks_client.get_rent().await.unwrap();
    let alice = env.alice.pubkey();
    let temp = keys.temp.pubkey();
    let escrow = keys.escrow.pubkey();

    vec![
        system_instruction::create_account(
            &alice,
            &temp,
            rent.minimum_balance(spl_token::state::Account::LEN),
            spl_token::state::Account::LEN as u64,
            &spl_token::id(),
        ),
        spl_token::instruction::initialize_account(&spl_token::id(), &temp, &env.mint_x, &alice)
            .unwrap(),
        spl_token::instruction::transfer(
            &spl_token::id(),
            &env.alice_x,
            &temp,
            &alice,
            &[],
            deposit,
        )
        .unwrap(),
        system_instruction::create_account(
            &alice,
            &escrow,
            rent.minimum_balance(escrow_space),
            escrow_space as u64,
            &program_id(),
        ),
        instruction::init_escrow(
            &program_id(),
            &alice,
            &temp,
            &env.alice_y,
            &escrow,
            expected_amount,
        ),
    ]
}

pub async fn try_open_escrow(
    context: &mut ProgramTestContext,
    env: &SwapEnv,
    deposit: u64,
    expected_amount: u64,
) -> (OpenEscrow, Result<(), BanksClientError>) {
    let keys = OpenEscrow {
        temp: Keypair::new(),
        escrow: Keypair::new(),
    };
    let instructions =
        init_escrow_instructions(context, env, &keys, deposit, expected_amount, Escrow::LEN)
            .await;
    let result = process(context, &instructions, &[&env.alice, &keys.temp, &keys.escrow]).await;
    (keys, result)
}

pub async fn open_escrow(
    context: &mut ProgramTestContext,
    env: &SwapEnv,
    deposit: u64,
    expected_amount: u64,
) -> OpenEscrow {
    let (keys, result) = try_open_escrow(context, env, deposit, expected_amount).await;
    result.unwrap();
    keys
}

/// Bob takes the trade, sending asset Y from `bob_y` and receiving asset X in `bob_x`.
pub fn exchange_ix(env: &SwapEnv, keys: &OpenEscrow, amount: Option<u64>) -> Instruction {
    instruction::exchange(
        &program_id(),
        &env.bob.pubkey(),
        &env.bob_y,
        &env.bob_x,
        &keys.temp.pubkey(),
        &env.alice.pubkey(),
        &env.alice_y,
        &keys.escrow.pubkey(),
        amount,
    )
}

pub fn cancel_ix(env: &SwapEnv, keys: &OpenEscrow) -> Instruction {
    instruction::cancel(
        &program_id(),
        &env.alice.pubkey(),
        &keys.temp.pubkey(),
        &env.alice_x,
        &keys.escrow.pubkey(),
    )
}

pub fn pda() -> Pubkey {
    escrow_authority(&program_id()).0
}

/// A funded temp token account still owned by Alice, ready to be escrowed.
pub async fn prepare_temp(
    context: &mut ProgramTestContext,
    env: &SwapEnv,
    deposit: u64,
) -> Keypair {
    let temp = Keypair::new();
    let rent = context.banks_client.get_rent().await.unwrap();
    let alice = env.alice.pubkey();
    let instructions = [
        system_instruction::create_account(
            &alice,
            &temp.pubkey(),
            rent.minimum_balance(spl_token::state::Account::LEN),
            spl_token::state::Account::LEN as u64,
            &spl_token::id(),
        ),
        spl_token::instruction::initialize_account3(
            &spl_token::id(),
            &temp.pubkey(),
            &env.mint_x,
            &alice,
        )
        .unwrap(),
        spl_token::instruction::transfer(
            &spl_token::id(),
            &env.alice_x,
            &temp.pubkey(),
            &alice,
            &[],
            deposit,
        )
        .unwrap(),
    ];
    process(context, &instructions, &[&env.alice, &temp]).await.unwrap();
    temp
}

/// An empty, rent-exempt escrow state account paid for by the context payer.
pub async fn create_escrow_account(context: &mut ProgramTestContext) -> Keypair {
    let escrow = Keypair::new();
    let rent = context.banks_client.get_rent().await.unwrap();
    let payer = context.payer.pubkey();
    let ix = system_instruction::create_account(
        &payer,
        &escrow.pubkey(),
        rent.minimum_balance(Escrow::LEN),
        Escrow::LEN as u64,
        &program_id(),
    );
    process(context, &[ix], &[&escrow]).await.unwrap();
    escrow
}

/// Alice's Initialize for an already prepared temp account and escrow account.
pub fn init_ix(env: &SwapEnv, temp: &Pubkey, escrow: &Pubkey, expected_amount: u64) -> Instruction {
    instruction::init_escrow(
        &program_id(),
        &env.alice.pubkey(),
        temp,
        &env.alice_y,
        escrow,
        expected_amount,
    )
}

/// Asserts an escrow opened by `open_escrow(.., deposit, expected_amount)` is
/// still open and that no tokens moved since.
pub async fn assert_escrow_untouched(
    context: &mut ProgramTestContext,
    env: &SwapEnv,
    keys: &OpenEscrow,
    deposit: u64,
    expected_amount: u64,
) {
    let escrow = read_escrow(context, &keys.escrow.pubkey())
        .await
        .expect("escrow account should exist");
    assert!(escrow.is_initialized);
    assert_eq!(escrow.expected_amount, expected_amount);

    let temp = token_account(context, &keys.temp.pubkey())
        .await
        .expect("temp account should exist");
    assert_eq!(temp.owner, pda());
    assert_eq!(temp.amount, deposit);

    assert_eq!(token_balance(context, &env.alice_x).await, ALICE_X - deposit);
    assert_eq!(token_balance(context, &env.alice_y).await, 0);
    assert_eq!(token_balance(context, &env.bob_x).await, 0);
    assert_eq!(token_balance(context, &env.bob_y).await, BOB_Y);
}
