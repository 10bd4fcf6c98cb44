/// Air-handler TCP Modbus device simulator
///
/// Serves a 400-register holding bank and keeps a handful of telemetry pairs
/// moving so the poller example has something to read. The register window
/// 200-399 is printed after each update, one row of eight registers per line.
use modbus_poller::codec::{Address, Word};
use modbus_poller::simulator::{spawn_tcp_simulator, RegisterBank, Simulator};
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

const FAN_ENERGY_ADDR: Address = 200;
const SUPPLY_TEMP_ADDR: Address = 210;
const FAN_FAULT_ADDR: Address = 216;

fn print_registers(bank: &RegisterBank, start_addr: Address, count: u16) {
    const COLS: Address = 8;
    let end_addr = start_addr + count;

    println!(
        "Holding Registers {start_addr} - {} (total {count})\n",
        end_addr - 1
    );
    let mut addr = start_addr;
    while addr < end_addr {
        print!("{addr:>4}: ");
        for c in 0..COLS.min(end_addr - addr) {
            print!("{:>6}", bank.get(addr + c));
        }
        println!();
        addr += COLS;
    }
}

#[tokio::main]
async fn main() {
    let socket_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 5502);
    let simulator = Simulator::new(RegisterBank::new(400));
    let bank = simulator.bank();

    let (bound_addr, _server) = spawn_tcp_simulator(socket_addr, simulator).await.unwrap();
    println!("Simulated device listening on {bound_addr}");

    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let temp_noise = Normal::new(21.5f32, 0.3).unwrap();
    let mut fan_energy: u32 = 0;
    let mut cycle: u32 = 0;

    let update_period = std::time::Duration::from_millis(500);
    loop {
        {
            let mut bank = bank.lock().unwrap();
            fan_energy += 3;
            bank.set_pair(FAN_ENERGY_ADDR, fan_energy);
            bank.set_pair(SUPPLY_TEMP_ADDR, temp_noise.sample(&mut rng).to_bits());
            // Fault code 5 for a few cycles out of every forty.
            let fault: Word = if cycle % 40 < 3 { 5 } else { 0 };
            bank.write(FAN_FAULT_ADDR, &[fault, 0]).unwrap();

            println!("\nUpdate {cycle}");
            print_registers(&bank, 200, 200);
        }
        cycle += 1;
        tokio::time::sleep(update_period).await;
    }
}
