#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pv_balance::core::energy_supply::elec_battery::ElectricBattery;

#[derive(Arbitrary, Debug)]
struct BalanceCase {
    capacity: f64,
    /// (production, consumption) per interval
    intervals: Vec<(f64, f64)>,
}

fuzz_target!(|case: BalanceCase| {
    let Ok(battery) = ElectricBattery::new(case.capacity) else {
        return;
    };
    if battery.capacity() > 1e9 {
        return;
    }

    let mut state = battery.empty();
    for (production, consumption) in case.intervals {
        if !(production.is_finite() && consumption.is_finite())
            || production < 0.
            || consumption < 0.
            || production > 1e9
            || consumption > 1e9
        {
            continue;
        }
        let (next_state, flows) = battery.charge_discharge_battery(state, production, consumption);

        let tolerance = 1e-6 * (1. + production + consumption + battery.capacity());
        assert!(next_state.energy_stored() >= 0.);
        assert!(next_state.energy_stored() <= battery.capacity());
        assert!(flows.grid_import == 0. || flows.grid_export == 0.);
        assert!(flows.battery_charge == 0. || flows.battery_discharge == 0.);
        assert!(
            (production + flows.grid_import + flows.battery_discharge
                - consumption
                - flows.grid_export
                - flows.battery_charge)
                .abs()
                <= tolerance
        );
        state = next_state;
    }
});
